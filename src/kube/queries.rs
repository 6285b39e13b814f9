//! Cluster query interface
//!
//! The mapper core depends only on the `ClusterQueries` trait; the real
//! implementation (`ApiClient`) and the scenario fixture (`MockCluster`)
//! both satisfy it. Fluid CRs are fetched dynamically since their schema
//! lives out-of-tree; built-in kinds use typed k8s-openapi APIs.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolume, PersistentVolumeClaim, Pod, Secret,
};
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::Api;
use thiserror::Error;

use crate::models::RuntimeKind;

/// Fluid API group and version
pub const FLUID_GROUP: &str = "data.fluid.io";
pub const FLUID_VERSION: &str = "v1alpha1";

/// Errors surfaced by the query interface
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    /// The type tag on a Dataset binding is not in the known runtime set.
    /// Distinct from NotFound so callers can prompt "extend the supported
    /// type table" rather than "check the name".
    #[error("unknown runtime type: {0}")]
    UnknownRuntimeType(String),

    #[error("kubernetes api error: {0}")]
    Api(#[from] kube::Error),
}

/// Capability set the resolver and discovery stages require.
///
/// All list operations are scoped by namespace and a label selector
/// string; `get_pv` is cluster-scoped. Implementations must map API 404s
/// to `QueryError::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterQueries: Send + Sync {
    async fn get_dataset(&self, name: &str, namespace: &str)
        -> Result<DynamicObject, QueryError>;

    async fn list_datasets(&self, namespace: &str) -> Result<Vec<DynamicObject>, QueryError>;

    /// Fetch a Runtime CR by declared type tag. Fails with
    /// `UnknownRuntimeType` when the tag is not in the known enumeration.
    async fn get_runtime(
        &self,
        runtime_type: &str,
        name: &str,
        namespace: &str,
    ) -> Result<DynamicObject, QueryError>;

    async fn list_stateful_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<StatefulSet>, QueryError>;

    async fn list_daemon_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DaemonSet>, QueryError>;

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, QueryError>;

    async fn list_pvcs(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, QueryError>;

    async fn get_pv(&self, name: &str) -> Result<PersistentVolume, QueryError>;

    async fn list_config_maps(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<ConfigMap>, QueryError>;

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, QueryError>;

    /// Cluster identifier for graph metadata only
    fn cluster_name(&self) -> String;
}

/// `ApiResource` for the Dataset CRD
pub fn dataset_resource() -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(FLUID_GROUP, FLUID_VERSION, "Dataset"),
        "datasets",
    )
}

/// `ApiResource` for a runtime CRD
pub fn runtime_resource(kind: RuntimeKind) -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(FLUID_GROUP, FLUID_VERSION, kind.cr_kind()),
        kind.plural(),
    )
}

/// Real cluster implementation over a kube client
pub struct ApiClient {
    client: kube::Client,
    cluster_name: String,
}

impl ApiClient {
    pub fn new(client: kube::Client, cluster_name: impl Into<String>) -> Self {
        Self {
            client,
            cluster_name: cluster_name.into(),
        }
    }

    fn list_params(label_selector: &str) -> ListParams {
        if label_selector.is_empty() {
            ListParams::default()
        } else {
            ListParams::default().labels(label_selector)
        }
    }

    fn map_get_error(kind: &str, namespace: &str, name: &str, err: kube::Error) -> QueryError {
        match err {
            kube::Error::Api(ref response) if response.code == 404 => QueryError::NotFound {
                kind: kind.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            other => QueryError::Api(other),
        }
    }
}

#[async_trait]
impl ClusterQueries for ApiClient {
    async fn get_dataset(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<DynamicObject, QueryError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &dataset_resource());
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error("Dataset", namespace, name, e))
    }

    async fn list_datasets(&self, namespace: &str) -> Result<Vec<DynamicObject>, QueryError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &dataset_resource());
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn get_runtime(
        &self,
        runtime_type: &str,
        name: &str,
        namespace: &str,
    ) -> Result<DynamicObject, QueryError> {
        let kind = RuntimeKind::parse_optional(runtime_type)
            .ok_or_else(|| QueryError::UnknownRuntimeType(runtime_type.to_string()))?;
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &runtime_resource(kind));
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error(kind.cr_kind(), namespace, name, e))
    }

    async fn list_stateful_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<StatefulSet>, QueryError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    async fn list_daemon_sets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DaemonSet>, QueryError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, QueryError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    async fn list_pvcs(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, QueryError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    async fn get_pv(&self, name: &str) -> Result<PersistentVolume, QueryError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error("PersistentVolume", "", name, e))
    }

    async fn list_config_maps(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<ConfigMap>, QueryError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    async fn list_secrets(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Secret>, QueryError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&Self::list_params(label_selector)).await?.items)
    }

    fn cluster_name(&self) -> String {
        self.cluster_name.clone()
    }
}
