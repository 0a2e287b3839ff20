use std::{fmt, sync::Arc};

use lectern_config::Config;
use lectern_core::application::{AppUnitOfWork, CourseService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CourseService>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(unit_of_work: AppUnitOfWork, config: Arc<Config>) -> Self {
        let service = CourseService::new(unit_of_work, config.ordering.into());
        Self {
            service: Arc::new(service),
            config,
        }
    }

    pub fn service(&self) -> &CourseService {
        &self.service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
