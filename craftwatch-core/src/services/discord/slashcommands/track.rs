// File: craftwatch-core/src/services/discord/slashcommands/track.rs
//
// The `/minecraft status` command: registers a new tracked server. The
// command surface enforces the administrator requirement; the refresh
// engine only sees valid registrations.

use std::sync::Arc;

use tracing::{debug, error};
use twilight_http::Client as HttpClient;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::application_command::{
    CommandData, CommandDataOption, CommandOptionValue,
};
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::channel::message::MessageFlags;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::{
    ChannelBuilder, CommandBuilder, StringBuilder, SubCommandBuilder,
};

use craftwatch_common::Error;
use craftwatch_common::models::tracker::ServerKind;

use crate::services::refresh::RefreshEngine;

pub const COMMAND_NAME: &str = "minecraft";

/// Build the global `/minecraft` command with its `status` subcommand.
pub fn create_minecraft_command() -> Command {
    CommandBuilder::new(
        COMMAND_NAME,
        "Manage Minecraft server status tracking",
        CommandType::ChatInput,
    )
    .option(
        SubCommandBuilder::new("status", "Track a Minecraft server status")
            .option(StringBuilder::new("ip", "Server IP address").required(true))
            .option(
                StringBuilder::new("type", "Server type")
                    .required(true)
                    .choices([("Java", "java"), ("Bedrock", "bedrock")]),
            )
            .option(ChannelBuilder::new("channel", "Channel to send status to").required(true)),
    )
    .build()
}

struct StatusCommandArgs {
    address: String,
    kind: ServerKind,
    channel_id: String,
}

fn parse_status_args(data: &CommandData) -> Result<StatusCommandArgs, Error> {
    let sub = data
        .options
        .iter()
        .find(|o| o.name == "status")
        .ok_or_else(|| Error::Parse("Missing status subcommand".into()))?;
    let CommandOptionValue::SubCommand(options) = &sub.value else {
        return Err(Error::Parse("Malformed status subcommand".into()));
    };

    let find_str = |name: &str| -> Result<String, Error> {
        options
            .iter()
            .find(|o: &&CommandDataOption| o.name == name)
            .and_then(|o| match &o.value {
                CommandOptionValue::String(s) => Some(s.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::Parse(format!("Missing option: {}", name)))
    };

    let address = find_str("ip")?;
    let kind: ServerKind = find_str("type")?.parse().map_err(Error::Parse)?;
    let channel_id = options
        .iter()
        .find(|o| o.name == "channel")
        .and_then(|o| match &o.value {
            CommandOptionValue::Channel(id) => Some(id.to_string()),
            _ => None,
        })
        .ok_or_else(|| Error::Parse("Missing option: channel".into()))?;

    Ok(StatusCommandArgs {
        address,
        kind,
        channel_id,
    })
}

fn is_administrator(interaction: &Interaction) -> bool {
    interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.contains(Permissions::ADMINISTRATOR))
}

async fn respond_ephemeral(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    interaction: &Interaction,
    content: &str,
) -> Result<(), Error> {
    http.interaction(application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some(content.to_string()),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error responding to interaction: {e:?}")))?;
    Ok(())
}

async fn defer_ephemeral(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    interaction: &Interaction,
) -> Result<(), Error> {
    http.interaction(application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::DeferredChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error deferring interaction: {e:?}")))?;
    Ok(())
}

async fn follow_up(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    interaction: &Interaction,
    content: &str,
) -> Result<(), Error> {
    http.interaction(application_id)
        .create_followup(&interaction.token)
        .content(content)
        .flags(MessageFlags::EPHEMERAL)
        .await
        .map_err(|e| Error::Platform(format!("Error sending follow-up: {e:?}")))?;
    Ok(())
}

/// Handle an incoming `/minecraft status` interaction end to end:
/// permission gate, deferred ephemeral ack, registration through the
/// refresh engine, and the final acknowledgment.
pub async fn handle_minecraft_interaction(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    engine: &Arc<RefreshEngine>,
    interaction: &Interaction,
) -> Result<(), Error> {
    let Some(InteractionData::ApplicationCommand(data)) = &interaction.data else {
        return Ok(());
    };
    if data.name != COMMAND_NAME {
        debug!("Ignoring unknown command: {}", data.name);
        return Ok(());
    }

    let Some(guild_id) = interaction.guild_id else {
        return respond_ephemeral(
            http,
            application_id,
            interaction,
            "❌ This command can only be used in a server.",
        )
        .await;
    };

    if !is_administrator(interaction) {
        return respond_ephemeral(
            http,
            application_id,
            interaction,
            "❌ You need administrator permissions to use this command.",
        )
        .await;
    }

    let args = match parse_status_args(data) {
        Ok(args) => args,
        Err(e) => {
            error!("Bad /minecraft status options: {}", e);
            return respond_ephemeral(
                http,
                application_id,
                interaction,
                "❌ Invalid command options.",
            )
            .await;
        }
    };

    defer_ephemeral(http, application_id, interaction).await?;

    match engine
        .track_new(
            &guild_id.to_string(),
            &args.channel_id,
            &args.address,
            args.kind,
        )
        .await
    {
        Ok(_key) => {
            follow_up(
                http,
                application_id,
                interaction,
                &format!(
                    "✅ Server status tracker has been set up in <#{}>. It will update automatically every 5 minutes.",
                    args.channel_id
                ),
            )
            .await
        }
        Err(e) => {
            error!("Error handling status command: {}", e);
            follow_up(
                http,
                application_id,
                interaction,
                "❌ Failed to fetch server status. Please check the IP and try again.",
            )
            .await
        }
    }
}
