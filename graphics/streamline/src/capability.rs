//! Feature capability table
//!
//! Optional feature entry points are resolved by feature id once, right after
//! the device is bound. Call sites look the function set up here and treat a
//! missing entry as "not available in this SDK build".

use std::sync::Arc;

use crate::sdk::{
    DlssFunctions, DlssgFunctions, FeatureInterface, PclFunctions, ReflexFunctions, Streamline,
};
use crate::types::Feature;

/// Feature id -> optional function set
#[derive(Clone, Default)]
pub struct Capabilities {
    reflex: Option<Arc<dyn ReflexFunctions>>,
    pcl: Option<Arc<dyn PclFunctions>>,
    dlss: Option<Arc<dyn DlssFunctions>>,
    dlssg: Option<Arc<dyn DlssgFunctions>>,
}

impl Capabilities {
    /// Resolve every optional feature the bridge drives
    pub fn resolve(sdk: &dyn Streamline) -> Self {
        let mut table = Self::default();

        for feature in Feature::ALL {
            match sdk.feature_interface(feature) {
                Some(interface) if interface.feature() == feature => table.insert(interface),
                Some(interface) => {
                    log::warn!(
                        "SDK returned {} functions when asked for {}, ignoring",
                        interface.feature(),
                        feature
                    );
                }
                None => log::debug!("{} functions not exported by this SDK build", feature),
            }
        }

        table
    }

    fn insert(&mut self, interface: FeatureInterface) {
        match interface {
            FeatureInterface::Reflex(functions) => self.reflex = Some(functions),
            FeatureInterface::Pcl(functions) => self.pcl = Some(functions),
            FeatureInterface::Dlss(functions) => self.dlss = Some(functions),
            FeatureInterface::FrameGeneration(functions) => self.dlssg = Some(functions),
        }
    }

    pub fn reflex(&self) -> Option<&Arc<dyn ReflexFunctions>> {
        self.reflex.as_ref()
    }

    pub fn pcl(&self) -> Option<&Arc<dyn PclFunctions>> {
        self.pcl.as_ref()
    }

    pub fn dlss(&self) -> Option<&Arc<dyn DlssFunctions>> {
        self.dlss.as_ref()
    }

    pub fn dlssg(&self) -> Option<&Arc<dyn DlssgFunctions>> {
        self.dlssg.as_ref()
    }

    pub fn is_resolved(&self, feature: Feature) -> bool {
        match feature {
            Feature::REFLEX => self.reflex.is_some(),
            Feature::PCL => self.pcl.is_some(),
            Feature::DLSS => self.dlss.is_some(),
            Feature::DLSS_G => self.dlssg.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStreamline;

    #[test]
    fn test_resolve_all() {
        let sdk = MockStreamline::new();
        let table = Capabilities::resolve(&sdk);
        for feature in Feature::ALL {
            assert!(table.is_resolved(feature), "{} should resolve", feature);
        }
    }

    #[test]
    fn test_missing_symbol_leaves_gap() {
        let sdk = MockStreamline::new();
        sdk.omit_interface(Feature::DLSS_G);

        let table = Capabilities::resolve(&sdk);
        assert!(table.dlss().is_some());
        assert!(table.dlssg().is_none());
        assert!(!table.is_resolved(Feature::DLSS_G));
    }

    #[test]
    fn test_empty_table() {
        let table = Capabilities::default();
        assert!(table.reflex().is_none());
        assert!(!table.is_resolved(Feature(77)));
    }
}
