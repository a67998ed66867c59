use std::io::Write;

use portal_core::VisibilityClient;
use portal_core::wire::VisibilityResponse;
use tracing::{info, instrument};

use crate::cli::Command;
use crate::config::Config;
use crate::http::HttpTransport;

#[instrument(skip(cfg, out))]
pub async fn dispatch(cfg: &Config, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::Toggle { entity, id } => {
            let client = VisibilityClient::new(HttpTransport::from_config(cfg)?);
            let reply = client.send_toggle(entity, id).await?;
            writeln!(out, "{}", describe_toggle(&entity.to_string(), id, &reply))?;
        }
        Command::Bulk(args) => {
            let make_visible = args.make_visible();
            let client = VisibilityClient::new(HttpTransport::from_config(cfg)?);
            let reply = client.send_bulk(args.activity_id, make_visible).await?;
            writeln!(
                out,
                "{}",
                describe_bulk(args.activity_id, make_visible, &reply)
            )?;
        }
        Command::Config => print_config(cfg, out)?,
    }

    info!("command finished");
    Ok(())
}

pub fn describe_toggle(entity: &str, id: i64, reply: &VisibilityResponse) -> String {
    match reply.is_visible {
        Some(true) => format!("{entity} {id} is now visible"),
        Some(false) => format!("{entity} {id} is now hidden"),
        None => format!("{entity} {id} toggled"),
    }
}

pub fn describe_bulk(activity_id: i64, make_visible: bool, reply: &VisibilityResponse) -> String {
    let state = if make_visible { "visible" } else { "hidden" };
    match reply.count {
        Some(count) => format!("activity {activity_id}: {count} score(s) now {state}"),
        None => format!("activity {activity_id}: scores now {state}"),
    }
}

fn print_config(cfg: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    for file in &cfg.loaded_files {
        writeln!(out, "# loaded {}", file.display())?;
    }
    for (key, value) in cfg.iter() {
        let shown = if key == "api.cookie" { "<redacted>" } else { value.as_str() };
        writeln!(out, "{key} = {shown}")?;
    }
    Ok(())
}
