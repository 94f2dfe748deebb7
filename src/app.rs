use crate::errors::ToolError;
use crate::managers::experiences::ExperienceManager;
use crate::managers::history::HistoryManager;
use crate::managers::jobs::JobsManager;
use crate::managers::profile::ProfileManager;
use crate::managers::register;
use crate::managers::tech_skill::TechSkillManager;
use crate::mcp::catalog::{invalid_schemas, tool_catalog};
use crate::services::api_client::{HttpTransport, ProfileApi, ReqwestTransport};
use crate::services::api_key::ApiKeyGate;
use crate::services::config::Config;
use crate::services::history::HistoryLog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
    pub history: HistoryLog,
}

impl App {
    fn validate_tool_wiring(handlers: &HashMap<String, Arc<dyn ToolHandler>>) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        let mut uncatalogued: Vec<String> = handlers
            .keys()
            .filter(|name| !tool_catalog().iter().any(|tool| &tool.name == *name))
            .cloned()
            .collect();
        let broken = invalid_schemas();
        if missing.is_empty() && uncatalogued.is_empty() && broken.is_empty() {
            return Ok(());
        }
        missing.sort();
        uncatalogued.sort();
        Err(ToolError::internal(format!(
            "Tool wiring is incomplete: missing handlers [{}], handlers without catalog entry [{}], invalid schemas [{}]",
            missing.join(", "),
            uncatalogued.join(", "),
            broken.join(", ")
        )))
    }

    pub fn initialize(config: Config) -> Result<Self, ToolError> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(config, transport)
    }

    /// Builds the app around an arbitrary transport; tests pass a stub here.
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self, ToolError> {
        let logger = Logger::new("lapras", config.log_level);
        let gate = ApiKeyGate::new(config.credentials.clone());
        let history = HistoryLog::new();
        let api = Arc::new(ProfileApi::new(config.base_url.clone(), transport, logger.clone()));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        register(&mut handlers, Arc::new(JobsManager::new(logger.clone(), api.clone())));
        register(
            &mut handlers,
            Arc::new(ExperienceManager::new(
                logger.clone(),
                api.clone(),
                gate.clone(),
                history.clone(),
            )),
        );
        register(
            &mut handlers,
            Arc::new(ProfileManager::new(
                logger.clone(),
                api.clone(),
                gate.clone(),
                history.clone(),
            )),
        );
        register(
            &mut handlers,
            Arc::new(TechSkillManager::new(logger.clone(), api, gate)),
        );
        register(
            &mut handlers,
            Arc::new(HistoryManager::new(logger.clone(), history.clone())),
        );

        Self::validate_tool_wiring(&handlers)?;
        logger.debug(
            "tools registered",
            Some(&serde_json::json!({
                "count": handlers.len(),
                "base_url": config.base_url.as_str(),
            })),
        );

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Ok(Self {
            logger,
            tool_executor,
            history,
        })
    }
}
