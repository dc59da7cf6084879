use async_trait::async_trait;
use offline_inspect::application::ports::{
    ConnectivityObserver, CreateReportInput, CreatedReport, OfflineResourcePayload,
    OnlineCallback, PromotionMapping, RemoteApi, RemoteClassification, RemoteLabel,
    RemoteResource, RemoteUnit,
};
use offline_inspect::shared::error::{AppError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted backend double. Counters make call patterns assertable; the fail
/// flags simulate a flaky server.
#[derive(Default)]
pub struct ScriptedRemote {
    pub resource_count: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub create_report_calls: AtomicUsize,
    pub create_resources_calls: AtomicUsize,
    pub fail_create_report: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl ScriptedRemote {
    pub fn with_resources(count: usize) -> Self {
        let remote = Self::default();
        remote.resource_count.store(count, Ordering::SeqCst);
        remote
    }
}

#[async_trait]
impl RemoteApi for ScriptedRemote {
    async fn fetch_all_resources(&self, is_fixed_asset: bool) -> Result<Vec<RemoteResource>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::NetworkFailure("catalog endpoint down".into()));
        }
        let count = self.resource_count.load(Ordering::SeqCst);
        Ok((0..count)
            .map(|n| RemoteResource {
                id: Some(format!("res-{n}")),
                resource_code: Some(format!("AF-{n:03}")),
                name: Some(format!("asset {n}")),
                description: None,
                is_fixed_asset: Some(is_fixed_asset),
                unit: Some(RemoteLabel {
                    name: "piece".into(),
                }),
                resource_type: None,
            })
            .collect())
    }

    async fn fetch_all_units(&self) -> Result<Vec<RemoteUnit>> {
        Ok(vec![RemoteUnit {
            id: Some("unit-1".into()),
            unit_code: Some("PC".into()),
            name: Some("piece".into()),
            description: None,
        }])
    }

    async fn fetch_all_classifications(&self) -> Result<Vec<RemoteClassification>> {
        Ok(vec![RemoteClassification {
            id: Some("cls-1".into()),
            name: Some("machinery".into()),
            parent_id: None,
            childs: vec![RemoteClassification {
                id: Some("cls-2".into()),
                name: Some("hand tools".into()),
                parent_id: Some("cls-1".into()),
                childs: vec![],
            }],
        }])
    }

    async fn create_report(&self, input: CreateReportInput) -> Result<CreatedReport> {
        self.create_report_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create_report.load(Ordering::SeqCst) {
            return Err(AppError::NetworkFailure("report endpoint down".into()));
        }
        assert!(input.is_offline_sync);
        Ok(CreatedReport {
            id: format!(
                "srv-report-{}",
                self.create_report_calls.load(Ordering::SeqCst)
            ),
            report_number: Some("R-0042".into()),
        })
    }

    async fn create_resources_from_offline(
        &self,
        payloads: Vec<OfflineResourcePayload>,
    ) -> Result<Vec<PromotionMapping>> {
        self.create_resources_calls.fetch_add(1, Ordering::SeqCst);
        Ok(payloads
            .iter()
            .enumerate()
            .map(|(n, p)| PromotionMapping {
                temp_id: p.temp_id.clone(),
                real_id: format!("srv-res-{n}"),
                real_code: format!("AF-9{n:02}"),
            })
            .collect())
    }
}

/// Switchable connectivity with observable restore callbacks.
pub struct SwitchableConnectivity {
    online: AtomicBool,
    callbacks: Mutex<Vec<OnlineCallback>>,
}

impl SwitchableConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            callbacks: Mutex::new(vec![]),
        }
    }

    pub fn set_online(&self, online: bool) {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            for callback in self.callbacks.lock().unwrap().iter() {
                callback();
            }
        }
    }
}

impl ConnectivityObserver for SwitchableConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn subscribe_online(&self, callback: OnlineCallback) {
        self.callbacks.lock().unwrap().push(callback);
    }
}
