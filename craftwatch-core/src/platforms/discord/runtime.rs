// craftwatch-core/src/platforms/discord/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::Interaction;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

use craftwatch_common::Error;

/// Gateway events the rest of the bot cares about. Everything else stays
/// inside the shard runner.
#[derive(Debug)]
pub enum DiscordEvent {
    /// Gateway handshake finished; carries the application id needed for
    /// interaction endpoints and command registration.
    Ready {
        application_id: Id<ApplicationMarker>,
    },
    InteractionCreate(Box<Interaction>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Forwards READY and INTERACTION_CREATE to the consumer channel.
async fn shard_runner(mut shard: Shard, tx: UnboundedSender<DiscordEvent>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    let wanted = EventTypeFlags::READY | EventTypeFlags::INTERACTION_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(event) => match event {
                Event::Ready(ready) => {
                    let data: &ReadyPayload = ready.as_ref();
                    info!(
                        "Shard {shard_id} => READY as {} (application {})",
                        data.user.name, data.application.id
                    );
                    let _ = tx.send(DiscordEvent::Ready {
                        application_id: data.application.id,
                    });
                }
                Event::InteractionCreate(interaction) => {
                    let _ = tx.send(DiscordEvent::InteractionCreate(Box::new(interaction.0)));
                }
                other => {
                    trace!("Shard {shard_id} => unhandled event: {other:?}");
                }
            },
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

pub struct DiscordPlatform {
    token: String,
    connection_status: ConnectionStatus,

    rx: Mutex<Option<UnboundedReceiver<DiscordEvent>>>,

    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,

    http: Option<Arc<HttpClient>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
        }
    }

    pub fn authenticate(&self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }

    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.connection_status == ConnectionStatus::Connected {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }
        self.authenticate()?;

        let (tx, rx) = unbounded_channel::<DiscordEvent>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        self.http = Some(http_client.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES,
        );

        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let tx_for_shard = tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();

        {
            let mut guard = self.rx.lock().await;
            *guard = None;
        }

        Ok(())
    }

    /// Await the next forwarded gateway event.
    pub async fn next_event(&self) -> Option<DiscordEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    pub fn http(&self) -> Result<Arc<HttpClient>, Error> {
        self.http
            .clone()
            .ok_or_else(|| Error::Platform("Discord HTTP client not available".into()))
    }

    /// Replace the application's global command set. The refresh cycle
    /// only starts once this has succeeded.
    pub async fn register_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        commands: &[Command],
    ) -> Result<(), Error> {
        let http = self.http()?;
        http.interaction(application_id)
            .set_global_commands(commands)
            .await
            .map_err(|e| Error::Platform(format!("Error registering commands: {e:?}")))?;
        info!("Commands registered successfully");
        Ok(())
    }
}
