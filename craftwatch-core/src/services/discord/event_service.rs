// File: craftwatch-core/src/services/discord/event_service.rs
//
// Consumes the gateway events forwarded by the Discord runtime. The first
// READY registers the slash commands and kicks off the refresh schedule
// (initial pass plus the periodic cadence); later READYs are reconnects
// and only re-register commands.

use std::sync::Arc;

use tracing::{error, info, warn};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

use craftwatch_common::Error;

use crate::platforms::discord::{DiscordEvent, DiscordPlatform};
use crate::services::discord::slashcommands::track;
use crate::services::refresh::RefreshEngine;
use crate::tasks::status_refresh::RefreshScheduler;

pub struct DiscordEventService {
    platform: Arc<DiscordPlatform>,
    engine: Arc<RefreshEngine>,
    scheduler: Arc<RefreshScheduler>,
}

impl DiscordEventService {
    pub fn new(
        platform: Arc<DiscordPlatform>,
        engine: Arc<RefreshEngine>,
        scheduler: Arc<RefreshScheduler>,
    ) -> Self {
        Self {
            platform,
            engine,
            scheduler,
        }
    }

    /// Run until the gateway channel closes.
    pub async fn run(&self) -> Result<(), Error> {
        let mut application_id: Option<Id<ApplicationMarker>> = None;
        let mut schedule_started = false;

        while let Some(event) = self.platform.next_event().await {
            match event {
                DiscordEvent::Ready { application_id: app_id } => {
                    application_id = Some(app_id);

                    if let Err(e) = self
                        .platform
                        .register_commands(app_id, &[track::create_minecraft_command()])
                        .await
                    {
                        // Without commands there is nothing to schedule.
                        error!("Error registering commands: {}", e);
                        continue;
                    }

                    if !schedule_started {
                        self.scheduler.start().await;
                        schedule_started = true;
                    } else {
                        info!("Gateway reconnected; refresh schedule already running");
                    }
                }
                DiscordEvent::InteractionCreate(interaction) => {
                    let Some(app_id) = application_id else {
                        warn!("Interaction received before READY; dropping");
                        continue;
                    };
                    let http = self.platform.http()?;
                    if let Err(e) = track::handle_minecraft_interaction(
                        &http,
                        app_id,
                        &self.engine,
                        &interaction,
                    )
                    .await
                    {
                        error!("Error handling interaction: {}", e);
                    }
                }
            }
        }

        warn!("Discord event stream ended");
        Ok(())
    }
}
