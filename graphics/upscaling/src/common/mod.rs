//! Common upscaling types and utilities

use core::ffi::c_void;

use streamline::{
    BufferType, Extent, NativeHandle, Resource, ResourceLifecycle, ResourceTag, ResourceType,
    SdkError, Streamline, ViewportHandle,
};

/// Upscaling error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UpscalingError {
    #[error("invalid DLSS mode {0}")]
    InvalidMode(i32),
    #[error("invalid frame generation mode {0}")]
    InvalidFrameGenMode(i32),
    #[error("invalid generated frame count {0}")]
    InvalidFrameCount(i32),
    #[error("null resource for buffer type {0}")]
    NullResource(u32),
    #[error("failed to get frame token: {0}")]
    FrameToken(SdkError),
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

/// A host texture to bind to a buffer role
#[derive(Debug, Clone, Copy)]
pub struct TagRequest {
    pub native: *mut c_void,
    pub role: BufferType,
    pub width: u32,
    pub height: u32,
    /// DXGI format code
    pub native_format: u32,
    /// D3D12 resource state bits
    pub state: u32,
}

impl TagRequest {
    /// Full-extent, current-frame-only tag for the request
    pub fn to_tag(&self) -> Result<ResourceTag, UpscalingError> {
        let native =
            NativeHandle::new(self.native).ok_or(UpscalingError::NullResource(self.role.0))?;

        Ok(ResourceTag {
            role: self.role,
            resource: Resource {
                kind: ResourceType::Tex2d,
                native,
                width: self.width,
                height: self.height,
                native_format: self.native_format,
                state: self.state,
            },
            extent: Extent {
                left: 0,
                top: 0,
                width: self.width,
                height: self.height,
            },
            lifecycle: ResourceLifecycle::OnlyValidNow,
        })
    }
}

/// Tag one resource for `frame_index` on `viewport`
///
/// Tags only live for the frame they were submitted on; callers resubmit them
/// every frame.
pub fn tag_resource(
    sdk: &dyn Streamline,
    viewport: ViewportHandle,
    request: &TagRequest,
    frame_index: u32,
) -> Result<(), UpscalingError> {
    log::trace!(
        "tag type={} {}x{} format={} state={:#x} ptr={:p}",
        request.role.0,
        request.width,
        request.height,
        request.native_format,
        request.state,
        request.native
    );

    let tag = request.to_tag()?;
    let token = sdk
        .get_new_frame_token(frame_index)
        .map_err(UpscalingError::FrameToken)?;

    sdk.set_tag_for_frame(&token, viewport, &[tag], None)
        .map_err(|err| {
            log::error!(
                "slSetTagForFrame failed for buffer type {}: {}",
                request.role.0,
                err
            );
            UpscalingError::Sdk(err)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};

    fn request(native: usize, role: BufferType) -> TagRequest {
        TagRequest {
            native: native as *mut c_void,
            role,
            width: 1920,
            height: 1080,
            native_format: 10,
            state: 0x80,
        }
    }

    #[test]
    fn test_tag_full_extent_valid_now() {
        let sdk = MockStreamline::new();
        tag_resource(
            &sdk,
            ViewportHandle(2),
            &request(0xbeef0, BufferType::DEPTH),
            9,
        )
        .unwrap();

        assert_eq!(
            sdk.calls(),
            vec![
                Call::GetNewFrameToken(9),
                Call::SetTagForFrame {
                    frame_index: 9,
                    viewport: ViewportHandle(2),
                    role: BufferType::DEPTH,
                    native: 0xbeef0,
                    width: 1920,
                    height: 1080,
                    lifecycle: ResourceLifecycle::OnlyValidNow,
                },
            ]
        );
    }

    #[test]
    fn test_null_resource_rejected() {
        let sdk = MockStreamline::new();
        let result = tag_resource(
            &sdk,
            ViewportHandle(0),
            &request(0, BufferType::MOTION_VECTORS),
            1,
        );
        assert_eq!(result, Err(UpscalingError::NullResource(1)));
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_tag_token_failure() {
        let sdk = MockStreamline::new();
        sdk.fail(EntryPoint::GetNewFrameToken, SdkError::NOT_INITIALIZED);

        let result = tag_resource(
            &sdk,
            ViewportHandle(0),
            &request(0x1000, BufferType::SCALING_INPUT_COLOR),
            1,
        );
        assert_eq!(
            result,
            Err(UpscalingError::FrameToken(SdkError::NOT_INITIALIZED))
        );
        assert_eq!(
            sdk.count(|call| matches!(call, Call::SetTagForFrame { .. })),
            0
        );
    }

    #[test]
    fn test_extent_matches_size() {
        let tag = request(0x2000, BufferType::SCALING_OUTPUT_COLOR)
            .to_tag()
            .unwrap();
        assert_eq!(
            tag.extent,
            Extent {
                left: 0,
                top: 0,
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(tag.resource.kind, ResourceType::Tex2d);
    }
}
