pub mod access_key;
pub mod pipeline;
pub mod region;
pub mod state;

use crate::session::Session;
use ionos_cloud::{
    CloudError, ManagedResource, OperationContext, ResourceRef, ResourceStatus, StateManager,
    TrackedResource,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Resource state that can be written to and read back from the state file
pub trait Tracked: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn status(&self) -> ResourceStatus;

    /// Location the resource lives in, empty for global products
    fn location(&self) -> &str {
        ""
    }

    /// Carry over values only the create response had
    fn carry(self, _prior: Self) -> Self {
        self
    }
}

impl Tracked for ionos_cloud_monitoring::PipelineState {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ResourceStatus {
        self.status
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn carry(mut self, prior: Self) -> Self {
        self.key = self.key.or(prior.key);
        self
    }
}

impl Tracked for ionos_cloud_objectstorage::AccessKeyState {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ResourceStatus {
        self.status
    }

    fn carry(mut self, prior: Self) -> Self {
        self.secret_key = self.secret_key.or(prior.secret_key);
        self
    }
}

/// Create a resource and record it; a partially created resource is
/// recorded as pending before the error is returned
pub async fn create_tracked<R>(
    state: &StateManager,
    resource: &R,
    ctx: &OperationContext,
    location: &str,
    spec: &R::Spec,
) -> anyhow::Result<R::State>
where
    R: ManagedResource,
    R::State: Tracked,
{
    match resource.create(ctx, location, spec).await {
        Ok(created) => {
            record(state, resource.kind(), &created).await?;
            Ok(created)
        }
        Err(e) => Err(keep_partial::<R::State>(state, resource.kind(), e).await),
    }
}

/// Read a resource and bring the state file in line with what was found.
///
/// An empty `location` falls back to the recorded one. A tracked resource is
/// refreshed, keeping create-only values; one that no longer exists is
/// forgotten and `None` is returned.
pub async fn read_tracked<R>(
    state: &StateManager,
    resource: &R,
    ctx: &OperationContext,
    id: &str,
    location: &str,
) -> anyhow::Result<Option<R::State>>
where
    R: ManagedResource,
    R::State: Tracked,
{
    let kind = resource.kind();
    let recorded = lookup::<R::State>(state, kind, id).await?;
    let location = match (&recorded, location.is_empty()) {
        (Some((recorded_location, _)), true) => recorded_location.clone(),
        _ => location.to_string(),
    };

    match resource.read(ctx, id, &location).await? {
        Some(observed) => match recorded {
            Some((_, prior)) => {
                let observed = observed.carry(prior);
                record(state, kind, &observed).await?;
                Ok(Some(observed))
            }
            None => Ok(Some(observed)),
        },
        None => {
            forget(state, kind, id).await?;
            Ok(None)
        }
    }
}

/// Delete a resource and drop it from the state file
pub async fn delete_tracked<R>(
    state: &StateManager,
    resource: &R,
    ctx: &OperationContext,
    id: &str,
    location: &str,
) -> anyhow::Result<()>
where
    R: ManagedResource,
    R::State: Tracked,
{
    resource.delete(ctx, id, location).await?;
    forget(state, resource.kind(), id).await
}

/// Store the latest observed state of a resource
pub async fn record<S: Tracked>(
    state: &StateManager,
    kind: &'static str,
    observed: &S,
) -> anyhow::Result<()> {
    store(state, kind, observed, observed.status()).await
}

async fn store<S: Tracked>(
    state: &StateManager,
    kind: &'static str,
    observed: &S,
    status: ResourceStatus,
) -> anyhow::Result<()> {
    let lock = state.acquire_lock().await?;
    let mut tracked = state.load().await?;

    let attributes = serde_json::to_value(observed)?;
    let resource = match tracked.get(kind, observed.id()).cloned() {
        Some(mut existing) => {
            existing.refresh(attributes, status);
            existing
        }
        None => {
            let target = ResourceRef::new(kind, observed.id(), observed.location());
            TrackedResource::new(&target, attributes).with_status(status)
        }
    };
    tracked.track(resource);

    state.save(&tracked).await?;
    lock.release().await?;
    Ok(())
}

/// Record whatever a failed create left behind as pending, then hand the
/// error back to the caller
pub async fn keep_partial<S: Tracked>(
    state: &StateManager,
    kind: &'static str,
    err: CloudError,
) -> anyhow::Error {
    let Some(created) = err.created() else {
        return err.into();
    };

    match serde_json::from_value::<S>(created.clone()) {
        Ok(observed) => match store(state, kind, &observed, ResourceStatus::Pending).await {
            Ok(()) => {
                tracing::warn!(kind, id = observed.id(), "Recorded partially created resource as pending")
            }
            Err(e) => tracing::error!(kind, error = %e, "Could not record partially created resource"),
        },
        Err(e) => tracing::error!(kind, error = %e, "Unreadable state in create error"),
    }
    err.into()
}

/// Drop a resource from the state file, e.g. after it was deleted
pub async fn forget(state: &StateManager, kind: &'static str, id: &str) -> anyhow::Result<()> {
    let lock = state.acquire_lock().await?;
    let mut tracked = state.load().await?;
    if tracked.forget(kind, id).is_some() {
        state.save(&tracked).await?;
        tracing::info!(kind, id, "Removed from tracked state");
    }
    lock.release().await?;
    Ok(())
}

/// Last recorded state and location of a resource, if tracked
pub async fn lookup<S: Tracked>(
    state: &StateManager,
    kind: &'static str,
    id: &str,
) -> anyhow::Result<Option<(String, S)>> {
    let tracked = state.load().await?;
    match tracked.get(kind, id) {
        Some(resource) => {
            let observed = serde_json::from_value(resource.attributes.clone())?;
            Ok(Some((resource.location.clone(), observed)))
        }
        None => Ok(None),
    }
}

/// `--location` when given, otherwise where the resource was recorded
pub fn location_for(session: &Session, recorded: Option<&str>) -> String {
    if session.location.is_empty() {
        recorded.unwrap_or_default().to_string()
    } else {
        session.location.clone()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ionos_cloud_monitoring::PipelineState;
    use ionos_cloud_objectstorage::AccessKeyState;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Resource whose create and read answers are scripted
    struct Scripted<S> {
        kind: &'static str,
        created: Mutex<Option<ionos_cloud::Result<S>>>,
        found: Option<S>,
        read_locations: Mutex<Vec<String>>,
    }

    impl<S> Scripted<S> {
        fn new(kind: &'static str) -> Self {
            Self {
                kind,
                created: Mutex::new(None),
                found: None,
                read_locations: Mutex::new(Vec::new()),
            }
        }

        fn creating(self, result: ionos_cloud::Result<S>) -> Self {
            *self.created.lock().unwrap() = Some(result);
            self
        }

        fn finding(mut self, found: Option<S>) -> Self {
            self.found = found;
            self
        }
    }

    #[async_trait]
    impl<S: Clone + Send + Sync> ManagedResource for Scripted<S> {
        type Spec = ();
        type State = S;

        fn kind(&self) -> &'static str {
            self.kind
        }

        async fn create(&self, _ctx: &OperationContext, _location: &str, _spec: &()) -> ionos_cloud::Result<S> {
            self.created.lock().unwrap().take().expect("create not scripted")
        }

        async fn read(&self, _ctx: &OperationContext, _id: &str, location: &str) -> ionos_cloud::Result<Option<S>> {
            self.read_locations.lock().unwrap().push(location.to_string());
            Ok(self.found.clone())
        }

        async fn update(
            &self,
            _ctx: &OperationContext,
            _id: &str,
            _location: &str,
            _spec: &(),
            prior: &S,
        ) -> ionos_cloud::Result<S> {
            Ok(prior.clone())
        }

        async fn delete(&self, _ctx: &OperationContext, _id: &str, _location: &str) -> ionos_cloud::Result<()> {
            Ok(())
        }
    }

    fn pipeline(key: Option<&str>) -> PipelineState {
        PipelineState {
            id: "p-1".to_string(),
            location: "es/vit".to_string(),
            name: "app-metrics".to_string(),
            status: ResourceStatus::Available,
            grafana_endpoint: None,
            http_endpoint: None,
            key: key.map(str::to_string),
        }
    }

    fn access_key(id: &str, secret: Option<&str>) -> AccessKeyState {
        AccessKeyState {
            id: id.to_string(),
            description: "ci uploads".to_string(),
            status: ResourceStatus::Available,
            access_key: Some(format!("AK-{id}")),
            canonical_user_id: None,
            contract_user_id: None,
            secret_key: secret.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_record_then_lookup() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        record(&state, "access key", &access_key("ak-1", Some("s3cr3t")))
            .await
            .unwrap();

        let (location, found) = lookup::<AccessKeyState>(&state, "access key", "ak-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location, "");
        assert_eq!(found.secret_key.as_deref(), Some("s3cr3t"));

        let missing = lookup::<AccessKeyState>(&state, "access key", "ak-2").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_record_refreshes_existing_entry() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        record(&state, "access key", &access_key("ak-1", Some("s3cr3t")))
            .await
            .unwrap();
        let mut renamed = access_key("ak-1", Some("s3cr3t"));
        renamed.description = "renamed".to_string();
        record(&state, "access key", &renamed).await.unwrap();

        let tracked = state.load().await.unwrap();
        assert_eq!(tracked.resources.len(), 1);
        let (_, found) = lookup::<AccessKeyState>(&state, "access key", "ak-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.description, "renamed");
    }

    #[tokio::test]
    async fn test_forget_removes_entry() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        record(&state, "access key", &access_key("ak-1", None)).await.unwrap();
        record(&state, "access key", &access_key("ak-2", None)).await.unwrap();
        forget(&state, "access key", "ak-1").await.unwrap();

        assert!(lookup::<AccessKeyState>(&state, "access key", "ak-1").await.unwrap().is_none());
        assert!(lookup::<AccessKeyState>(&state, "access key", "ak-2").await.unwrap().is_some());

        // Forgetting an untracked resource is not an error
        forget(&state, "access key", "ak-9").await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_create_is_recorded_as_pending() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        let created = access_key("ak-1", Some("s3cr3t"));
        let timeout = CloudError::Timeout {
            kind: "access key",
            id: "ak-1".to_string(),
            last_status: "PROVISIONING".to_string(),
            elapsed: std::time::Duration::from_secs(600),
        };
        let err = CloudError::partial_create("access key", "ak-1", &created, timeout);

        let err = keep_partial::<AccessKeyState>(&state, "access key", err).await;
        assert!(err.to_string().contains("ak-1"));

        let tracked = state.load().await.unwrap();
        let entry = tracked.get("access key", "ak-1").unwrap();
        assert_eq!(entry.status, ResourceStatus::Pending);
        assert_eq!(entry.attributes["secret_key"], "s3cr3t");
    }

    #[tokio::test]
    async fn test_other_errors_leave_state_untouched() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        let err = CloudError::Api {
            status: 422,
            message: "invalid description".to_string(),
        };
        let err = keep_partial::<AccessKeyState>(&state, "access key", err).await;
        assert!(err.to_string().contains("invalid description"));
        assert!(state.load().await.unwrap().resources.is_empty());
    }

    #[tokio::test]
    async fn test_create_is_recorded() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());
        let pipelines = Scripted::new("pipeline").creating(Ok(pipeline(Some("ingest-key"))));

        let created = create_tracked(&state, &pipelines, &OperationContext::new(), "es/vit", &())
            .await
            .unwrap();
        assert_eq!(created.id, "p-1");

        let tracked = state.load().await.unwrap();
        let entry = tracked.get("pipeline", "p-1").unwrap();
        assert_eq!(entry.location, "es/vit");
        assert_eq!(entry.status, ResourceStatus::Available);
        assert_eq!(entry.attributes["key"], "ingest-key");
    }

    #[tokio::test]
    async fn test_timed_out_create_keeps_secret_in_state() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        let mut created = access_key("ak-1", Some("s3cr3t"));
        created.status = ResourceStatus::Pending;
        let timeout = CloudError::Timeout {
            kind: "access key",
            id: "ak-1".to_string(),
            last_status: "PROVISIONING".to_string(),
            elapsed: std::time::Duration::from_secs(5),
        };
        let keys = Scripted::<AccessKeyState>::new("access key").creating(Err(
            CloudError::partial_create("access key", "ak-1", &created, timeout),
        ));

        let err = create_tracked(&state, &keys, &OperationContext::new(), "", &())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ak-1"));

        let (_, recorded) = lookup::<AccessKeyState>(&state, "access key", "ak-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recorded.secret_key.as_deref(), Some("s3cr3t"));
        let tracked = state.load().await.unwrap();
        assert_eq!(tracked.get("access key", "ak-1").unwrap().status, ResourceStatus::Pending);
    }

    #[tokio::test]
    async fn test_read_keeps_recorded_secret() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());
        record(&state, "access key", &access_key("ak-1", Some("s3cr3t")))
            .await
            .unwrap();

        let keys = Scripted::new("access key").finding(Some(access_key("ak-1", None)));
        let found = read_tracked(&state, &keys, &OperationContext::new(), "ak-1", "")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.secret_key.as_deref(), Some("s3cr3t"));

        let (_, recorded) = lookup::<AccessKeyState>(&state, "access key", "ak-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recorded.secret_key.as_deref(), Some("s3cr3t"));
    }

    #[tokio::test]
    async fn test_read_uses_recorded_location_and_keeps_key() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());
        record(&state, "pipeline", &pipeline(Some("ingest-key"))).await.unwrap();

        let pipelines = Scripted::new("pipeline").finding(Some(pipeline(None)));
        let found = read_tracked(&state, &pipelines, &OperationContext::new(), "p-1", "")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.key.as_deref(), Some("ingest-key"));
        assert_eq!(*pipelines.read_locations.lock().unwrap(), vec!["es/vit".to_string()]);

        read_tracked(&state, &pipelines, &OperationContext::new(), "p-1", "de/fra")
            .await
            .unwrap();
        assert_eq!(pipelines.read_locations.lock().unwrap()[1], "de/fra");
    }

    #[tokio::test]
    async fn test_read_of_vanished_resource_forgets_it() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());
        record(&state, "access key", &access_key("ak-1", Some("s3cr3t")))
            .await
            .unwrap();

        let keys = Scripted::<AccessKeyState>::new("access key").finding(None);
        let found = read_tracked(&state, &keys, &OperationContext::new(), "ak-1", "")
            .await
            .unwrap();

        assert!(found.is_none());
        assert!(state.load().await.unwrap().resources.is_empty());
    }

    #[tokio::test]
    async fn test_read_of_untracked_resource_is_not_recorded() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());

        let keys = Scripted::new("access key").finding(Some(access_key("ak-1", None)));
        let found = read_tracked(&state, &keys, &OperationContext::new(), "ak-1", "")
            .await
            .unwrap();

        assert!(found.is_some());
        assert!(state.load().await.unwrap().resources.is_empty());
    }

    #[tokio::test]
    async fn test_delete_forgets_resource() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path());
        record(&state, "pipeline", &pipeline(None)).await.unwrap();

        let pipelines = Scripted::<PipelineState>::new("pipeline");
        delete_tracked(&state, &pipelines, &OperationContext::new(), "p-1", "es/vit")
            .await
            .unwrap();
        assert!(state.load().await.unwrap().resources.is_empty());
    }
}
