//! SDK result codes

use core::ffi::CStr;

/// Result type for SDK entry points
pub type SdkResult<T> = Result<T, SdkError>;

/// Non-OK result code returned by an SDK entry point
///
/// Codes follow the SDK's `sl::Result` numbering; `0` is success and never
/// appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{} ({})", code_name(.0), .0)]
pub struct SdkError(pub i32);

/// Symbolic names indexed by result code
const NAMES: [&CStr; 40] = [
    c"eOk",
    c"eErrorIO",
    c"eErrorDriverOutOfDate",
    c"eErrorOSOutOfDate",
    c"eErrorOSDisabledHWS",
    c"eErrorDeviceNotCreated",
    c"eErrorNoSupportedAdapterFound",
    c"eErrorAdapterNotSupported",
    c"eErrorNoPlugins",
    c"eErrorVulkanAPI",
    c"eErrorDXGIAPI",
    c"eErrorD3DAPI",
    c"eErrorNRDAPI",
    c"eErrorNVAPI",
    c"eErrorReflexAPI",
    c"eErrorNGXFailed",
    c"eErrorJSONParsing",
    c"eErrorMissingProxy",
    c"eErrorMissingResourceState",
    c"eErrorInvalidIntegration",
    c"eErrorMissingInputParameter",
    c"eErrorNotInitialized",
    c"eErrorComputeFailed",
    c"eErrorInitNotCalled",
    c"eErrorExceptionHandler",
    c"eErrorInvalidParameter",
    c"eErrorMissingConstants",
    c"eErrorDuplicatedConstants",
    c"eErrorMissingOrInvalidAPI",
    c"eErrorCommonConstantsMissing",
    c"eErrorUnsupportedInterface",
    c"eErrorFeatureMissing",
    c"eErrorFeatureNotSupported",
    c"eErrorFeatureMissingHooks",
    c"eErrorFeatureFailedToLoad",
    c"eErrorFeatureWrongPriority",
    c"eErrorFeatureMissingDependency",
    c"eErrorFeatureManagerInvalidState",
    c"eErrorInvalidState",
    c"eWarnOutOfVRAM",
];

fn code_c_name(code: i32) -> &'static CStr {
    usize::try_from(code)
        .ok()
        .and_then(|index| NAMES.get(index).copied())
        .unwrap_or(c"Unknown")
}

fn code_name(code: &i32) -> &'static str {
    code_c_name(*code).to_str().unwrap_or("Unknown")
}

impl SdkError {
    pub const IO: Self = Self(1);
    pub const DRIVER_OUT_OF_DATE: Self = Self(2);
    pub const OS_OUT_OF_DATE: Self = Self(3);
    pub const OS_DISABLED_HWS: Self = Self(4);
    pub const DEVICE_NOT_CREATED: Self = Self(5);
    pub const ADAPTER_NOT_SUPPORTED: Self = Self(7);
    pub const NOT_INITIALIZED: Self = Self(21);
    pub const INVALID_PARAMETER: Self = Self(25);
    pub const MISSING_CONSTANTS: Self = Self(26);
    pub const MISSING_OR_INVALID_API: Self = Self(28);
    pub const FEATURE_MISSING: Self = Self(31);
    pub const FEATURE_NOT_SUPPORTED: Self = Self(32);
    pub const INVALID_STATE: Self = Self(38);

    /// Raw result code
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Symbolic name, `"Unknown"` for codes outside the table
    pub fn name(&self) -> &'static str {
        code_name(&self.0)
    }

    /// Symbolic name as a C string with static lifetime
    pub fn c_name(&self) -> &'static CStr {
        code_c_name(self.0)
    }

    /// Convert a raw code into a result
    pub fn check(code: i32) -> SdkResult<()> {
        if code == 0 {
            Ok(())
        } else {
            Err(Self(code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_numbering() {
        assert_eq!(SdkError::NOT_INITIALIZED.name(), "eErrorNotInitialized");
        assert_eq!(SdkError::MISSING_OR_INVALID_API.name(), "eErrorMissingOrInvalidAPI");
        assert_eq!(SdkError::ADAPTER_NOT_SUPPORTED.name(), "eErrorAdapterNotSupported");
        assert_eq!(SdkError(-3).name(), "Unknown");
        assert_eq!(SdkError(4000).name(), "Unknown");
        assert_eq!(SdkError::IO.c_name(), c"eErrorIO");
    }

    #[test]
    fn test_display_includes_code() {
        let message = SdkError::DRIVER_OUT_OF_DATE.to_string();
        assert_eq!(message, "eErrorDriverOutOfDate (2)");
    }

    #[test]
    fn test_check() {
        assert!(SdkError::check(0).is_ok());
        assert_eq!(SdkError::check(21), Err(SdkError::NOT_INITIALIZED));
    }
}
