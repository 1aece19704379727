//! Typed operation catalogue
//!
//! Each service binds a [`Client`] to a zone and exposes one method per API
//! action. A method only builds the operation and hands its input to
//! [`Client::send`]; all behavior lives in the shared pipeline.

use crate::client::Client;

pub mod cache;
pub mod certificate;
pub mod cluster;
pub mod job;
pub mod monitor;
pub mod tag;

pub use cache::CacheService;
pub use certificate::CertificateService;
pub use cluster::ClusterService;
pub use job::JobService;
pub use monitor::MonitorService;
pub use tag::TagService;

impl Client {
    pub fn caches(&self, zone: impl Into<String>) -> CacheService {
        CacheService::new(self.clone(), self.properties_for(Some(zone.into())))
    }

    pub fn monitor(&self, zone: impl Into<String>) -> MonitorService {
        MonitorService::new(self.clone(), self.properties_for(Some(zone.into())))
    }

    pub fn clusters(&self, zone: impl Into<String>) -> ClusterService {
        ClusterService::new(self.clone(), self.properties_for(Some(zone.into())))
    }

    pub fn tags(&self, zone: impl Into<String>) -> TagService {
        TagService::new(self.clone(), self.properties_for(Some(zone.into())))
    }

    pub fn certificates(&self, zone: impl Into<String>) -> CertificateService {
        CertificateService::new(self.clone(), self.properties_for(Some(zone.into())))
    }

    /// Job service for `zone`, or the configured default zone
    pub fn jobs(&self, zone: Option<String>) -> JobService {
        JobService::new(self.clone(), self.properties_for(zone))
    }
}

#[cfg(test)]
pub(crate) mod coverage {
    //! Check that a fully populated sample serializes to exactly the
    //! declared parameter names, so a descriptor cannot drift from its type.

    use std::collections::BTreeSet;

    use serde::Serialize;

    use crate::schema::Schema;

    pub(crate) fn assert_schema_matches<T: Serialize + Schema>(sample: &T) {
        let schema = T::schema();
        assert!(
            schema.duplicate_names().is_empty(),
            "{} declares {:?} twice",
            schema.type_name,
            schema.duplicate_names()
        );

        let serialized: BTreeSet<String> = match serde_json::to_value(sample).unwrap() {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("{} serialized to {}", schema.type_name, other),
        };
        let declared: BTreeSet<String> = schema.fields.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(serialized, declared, "{} drifted from its schema", schema.type_name);
    }
}
