use std::{sync::Arc, time::Duration};

use anyhow::Context;
use catalog::{CombinationCatalog, ScriptLibrary};
use control::{ActionRouter, MacroProcessManager, OsMacroSupervisor, SessionStore};
use input::{DryRunDriver, HidDevices, InputDriver, ReplayConfig, ReplayDriver};
use tracing::info;

use crate::config::Settings;

pub(crate) struct AppState {
    pub(crate) catalog: Arc<CombinationCatalog>,
    pub(crate) library: Arc<ScriptLibrary>,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) actions: ActionRouter,
    pub(crate) macros: MacroProcessManager,
    pub(crate) hid: HidDevices,
    pub(crate) dry_run: bool,
}

impl AppState {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let library = Arc::new(
            ScriptLibrary::new(&settings.script_dir, &settings.images_dir)
                .with_max_image_bytes(settings.max_image_bytes),
        );
        let catalog = Arc::new(library.build_catalog().with_context(|| {
            format!(
                "failed to scan script directory '{}'",
                settings.script_dir.display()
            )
        })?);
        info!(combinations = catalog.len(), "catalog ready");

        let hid = HidDevices {
            keyboard: settings.keyboard_device.clone(),
            mouse: settings.mouse_device.clone(),
        };
        let driver: Arc<dyn InputDriver> = if settings.dry_run {
            Arc::new(DryRunDriver::new().with_real_waits())
        } else {
            Arc::new(ReplayDriver::new(ReplayConfig {
                interpreter: settings.interpreter.clone(),
                replay_program: settings.replay_program.clone(),
                mouse_program: settings.mouse_program.clone(),
                action_timeout: Duration::from_secs(settings.action_timeout_secs),
            }))
        };
        let supervisor = Arc::new(OsMacroSupervisor::new(
            settings.interpreter.clone(),
            settings.replay_program.clone(),
            hid.clone(),
        ));

        let session = Arc::new(SessionStore::new(Arc::clone(&catalog)));
        let actions = ActionRouter::new(Arc::clone(&session), Arc::clone(&catalog), driver);
        let macros = MacroProcessManager::new(library.clone(), supervisor)
            .with_stop_timeout(Duration::from_secs(settings.stop_timeout_secs));

        Ok(Self {
            catalog,
            library,
            session,
            actions,
            macros,
            hid,
            dry_run: settings.dry_run,
        })
    }
}
