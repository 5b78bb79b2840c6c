use crate::clock::{Clock, ClockDisplay};
use crate::notify::NotificationCenter;
use crate::storage::StoreData;
use crate::tracker::Staging;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{watch, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<StoreData>>,
    pub staging: Arc<Mutex<Staging>>,
    pub clock: Arc<dyn Clock>,
    pub notifications: Arc<NotificationCenter>,
    pub clock_display: Arc<watch::Sender<ClockDisplay>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: StoreData, clock: Arc<dyn Clock>) -> Self {
        let (clock_display, _) = watch::channel(ClockDisplay::at(clock.now()));
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            staging: Arc::new(Mutex::new(Staging::default())),
            clock,
            notifications: Arc::new(NotificationCenter::default()),
            clock_display: Arc::new(clock_display),
        }
    }
}
