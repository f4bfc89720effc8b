//! Conversion registry from versioned kubelet payloads to the canonical form
//!
//! A [`Scheme`] maps a [`GroupVersion`] to the function converting that
//! version's wire type into [`KubeletConfiguration`]. The built-in scheme is
//! process-wide and initialized once.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::ConversionError;
use crate::kubelet::{self, v1beta1, KubeletConfiguration};

/// API group and version of a configuration payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    pub group: &'static str,
    pub version: &'static str,
}

impl GroupVersion {
    pub const fn new(group: &'static str, version: &'static str) -> Self {
        Self { group, version }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.version)
    }
}

/// A wire type whose schema version is a property of the type itself
pub trait VersionedConfig: Any {
    const GROUP_VERSION: GroupVersion;
}

type ConversionFn =
    Box<dyn Fn(&dyn Any) -> Result<KubeletConfiguration, ConversionError> + Send + Sync>;

/// Global scheme (built once)
static GLOBAL_SCHEME: OnceLock<Scheme> = OnceLock::new();

/// Registry of conversions keyed by group/version
#[derive(Default)]
pub struct Scheme {
    conversions: HashMap<GroupVersion, ConversionFn>,
}

impl Scheme {
    /// Create an empty scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheme with every built-in kubelet conversion registered
    pub fn with_kubelet_conversions() -> Self {
        let mut scheme = Self::new();
        scheme.register::<v1beta1::KubeletConfiguration>(kubelet::convert_v1beta1);
        scheme
    }

    /// The process-wide scheme carrying the built-in conversions
    pub fn global() -> &'static Scheme {
        GLOBAL_SCHEME.get_or_init(Self::with_kubelet_conversions)
    }

    /// Register the conversion for `V`, replacing any previous one for its version
    pub fn register<V: VersionedConfig>(
        &mut self,
        convert: fn(&V) -> Result<KubeletConfiguration, ConversionError>,
    ) {
        let group_version = V::GROUP_VERSION;
        let wrapped: ConversionFn = Box::new(move |payload: &dyn Any| {
            let versioned = payload
                .downcast_ref::<V>()
                .ok_or(ConversionError::TypeMismatch { group_version })?;
            convert(versioned)
        });

        if self.conversions.insert(group_version, wrapped).is_some() {
            debug!(%group_version, "Replaced registered conversion");
        }
    }

    pub fn is_registered(&self, group_version: &GroupVersion) -> bool {
        self.conversions.contains_key(group_version)
    }

    /// Registered versions, in no particular order
    pub fn group_versions(&self) -> impl Iterator<Item = &GroupVersion> {
        self.conversions.keys()
    }

    /// Convert a versioned payload into the canonical configuration
    pub fn convert<V: VersionedConfig>(
        &self,
        versioned: &V,
    ) -> Result<KubeletConfiguration, ConversionError> {
        let convert = self
            .conversions
            .get(&V::GROUP_VERSION)
            .ok_or(ConversionError::NotRegistered(V::GROUP_VERSION))?;
        convert(versioned as &dyn Any)
    }
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheme")
            .field("group_versions", &self.conversions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;

    impl VersionedConfig for Alpha {
        const GROUP_VERSION: GroupVersion = GroupVersion::new("kubelet.config.k8s.io", "v1alpha1");
    }

    /// Claims the v1beta1 version without being the v1beta1 type
    struct Impostor;

    impl VersionedConfig for Impostor {
        const GROUP_VERSION: GroupVersion = v1beta1::KubeletConfiguration::GROUP_VERSION;
    }

    fn alpha_to_internal(_: &Alpha) -> Result<KubeletConfiguration, ConversionError> {
        kubelet::convert_v1beta1(&v1beta1::KubeletConfiguration::default())
    }

    #[test]
    fn test_group_version_display() {
        let gv = GroupVersion::new("kubelet.config.k8s.io", "v1beta1");
        assert_eq!(gv.to_string(), "kubelet.config.k8s.io/v1beta1");
    }

    #[test]
    fn test_global_scheme_has_v1beta1() {
        let scheme = Scheme::global();
        assert!(scheme.is_registered(&v1beta1::KubeletConfiguration::GROUP_VERSION));
        assert!(std::ptr::eq(scheme, Scheme::global()));
    }

    #[test]
    fn test_unregistered_version_fails() {
        let scheme = Scheme::new();
        let result = scheme.convert(&v1beta1::KubeletConfiguration::default());

        match result {
            Err(ConversionError::NotRegistered(gv)) => {
                assert_eq!(gv, v1beta1::KubeletConfiguration::GROUP_VERSION)
            }
            other => panic!("expected NotRegistered, got {:?}", other),
        }
    }

    #[test]
    fn test_register_additional_version() {
        let mut scheme = Scheme::with_kubelet_conversions();
        scheme.register::<Alpha>(alpha_to_internal);

        assert_eq!(scheme.group_versions().count(), 2);
        let config = scheme.convert(&Alpha).unwrap();
        assert_eq!(config.topology_manager_policy.as_str(), "none");
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let scheme = Scheme::with_kubelet_conversions();
        let result = scheme.convert(&Impostor);

        assert!(matches!(
            result,
            Err(ConversionError::TypeMismatch { .. })
        ));
    }
}
