// craftwatch-core/src/platforms/discord/publisher.rs
//
// Maps the platform-neutral NotificationPayload onto a Discord embed plus
// attachments. A 404 from the edit endpoint becomes Error::NotFound so the
// refresh engine can fall back to recreating the message; every other
// failure is an ordinary platform error.

use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_http::error::ErrorType;
use twilight_model::channel::message::Embed;
use twilight_model::http::attachment::Attachment;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_util::builder::embed::{
    EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};

use craftwatch_common::Error;
use craftwatch_common::models::notification::NotificationPayload;
use craftwatch_common::traits::platform_traits::NotificationPublisher;

pub struct DiscordPublisher {
    http: Arc<HttpClient>,
}

impl DiscordPublisher {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn parse_channel_id(channel: &str) -> Result<Id<ChannelMarker>, Error> {
        let raw: u64 = channel
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid channel ID: {channel}")))?;
        Ok(Id::new(raw))
    }

    fn parse_message_id(message: &str) -> Result<Id<MessageMarker>, Error> {
        let raw: u64 = message
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid message ID: {message}")))?;
        Ok(Id::new(raw))
    }

    fn build_embed(payload: &NotificationPayload) -> Result<Embed, Error> {
        let s = &payload.summary;
        let mut builder = EmbedBuilder::new()
            .title(s.title.clone())
            .color(s.color)
            .field(EmbedFieldBuilder::new("Server IP", s.address.clone()).inline())
            .field(EmbedFieldBuilder::new("Status", s.status_line.clone()).inline())
            .field(EmbedFieldBuilder::new("Version", s.version.clone()).inline())
            .field(EmbedFieldBuilder::new("Players", s.players.clone()).inline())
            .field(EmbedFieldBuilder::new("Ping", s.ping.clone()).inline())
            .footer(EmbedFooterBuilder::new(s.footer.clone()));

        if let Some(motd) = &payload.motd_image {
            let source = ImageSource::attachment(&motd.filename)
                .map_err(|e| Error::Platform(format!("Bad attachment name: {e}")))?;
            builder = builder.image(source);
        }
        if let Some(icon) = &payload.icon_image {
            let source = ImageSource::attachment(&icon.filename)
                .map_err(|e| Error::Platform(format!("Bad attachment name: {e}")))?;
            builder = builder.thumbnail(source);
        }

        Ok(builder.build())
    }

    fn build_attachments(payload: &NotificationPayload) -> Vec<Attachment> {
        let mut attachments = Vec::new();
        let mut next_id = 0u64;
        if let Some(motd) = &payload.motd_image {
            attachments.push(Attachment::from_bytes(
                motd.filename.clone(),
                motd.bytes.clone(),
                next_id,
            ));
            next_id += 1;
        }
        if let Some(icon) = &payload.icon_image {
            attachments.push(Attachment::from_bytes(
                icon.filename.clone(),
                icon.bytes.clone(),
                next_id,
            ));
        }
        attachments
    }

    fn map_publish_error(context: &str, e: twilight_http::Error) -> Error {
        if let ErrorType::Response { status, .. } = e.kind() {
            if status.get() == 404 {
                return Error::NotFound(format!("{context}: message no longer exists"));
            }
        }
        Error::Platform(format!("{context}: {e:?}"))
    }
}

#[async_trait]
impl NotificationPublisher for DiscordPublisher {
    async fn create(
        &self,
        channel_id: &str,
        payload: &NotificationPayload,
    ) -> Result<String, Error> {
        let channel = Self::parse_channel_id(channel_id)?;
        let embed = Self::build_embed(payload)?;
        let attachments = Self::build_attachments(payload);

        let resp = self
            .http
            .create_message(channel)
            .embeds(&[embed])
            .attachments(&attachments)
            .await
            .map_err(|e| Error::Platform(format!("Error sending status message: {e:?}")))?;

        let message = resp
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing created message: {e:?}")))?;
        Ok(message.id.to_string())
    }

    async fn edit(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &NotificationPayload,
    ) -> Result<(), Error> {
        let channel = Self::parse_channel_id(channel_id)?;
        let message = Self::parse_message_id(message_id)?;
        let embed = Self::build_embed(payload)?;
        let attachments = Self::build_attachments(payload);

        self.http
            .update_message(channel, message)
            .embeds(Some(&[embed]))
            .attachments(&attachments)
            .await
            .map_err(|e| Self::map_publish_error("Error editing status message", e))?;

        Ok(())
    }
}
