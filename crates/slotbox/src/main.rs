use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use slotbox_core::admin::AdminConfigStore;
use slotbox_core::auth::AccessArbiter;
use slotbox_core::model::{Document, DocumentKind, Role, SlotId};
use slotbox_core::poc::{synthesize, PocKind};
use slotbox_core::preview::render_preview;
use slotbox_core::slots::SlotStore;
use slotbox_core::surface::{
    change_email, Disposition, EmailChangeOutcome, RequestMethod, UploadRegistry,
    CSP_ISOLATED_ORIGIN, PDF_CONTENT_TYPE,
};

#[derive(Parser)]
#[command(name = "slotbox", about = "Slotted PDF document-isolation demo harness")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Synthesize a PoC PDF (script payload or CSRF link)")]
    Synth {
        #[arg(value_parser = ["script", "link"])]
        kind: String,
        #[arg(long, help = "Target origin for the link PoC")]
        target: Option<String>,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value = "inline", value_parser = ["inline", "attachment"])]
        disposition: String,
    },
    #[command(about = "Render a safe raster preview card for a PDF")]
    Preview {
        pdf: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, help = "Fallback title when the PDF has no extractable text")]
        title: Option<String>,
    },
    #[command(about = "Operate on the role-scoped slot store")]
    Slot {
        #[command(subcommand)]
        action: SlotAction,
    },
    #[command(about = "Read or change the shared admin email record")]
    AdminEmail {
        #[command(subcommand)]
        action: AdminAction,
    },
    #[command(about = "Store a file in the insecure single-slot upload area")]
    Upload {
        file: PathBuf,
        #[arg(long)]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum SlotAction {
    Put {
        slot: u8,
        pdf: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    Delete {
        slot: u8,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    List {
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    Get {
        #[arg(long)]
        state: PathBuf,
    },
    Set {
        email: String,
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Synth { kind, target, out, disposition } => {
            run_synth(&kind, target.as_deref(), &out, &disposition)
        }
        Command::Preview { pdf, out, title } => run_preview(&pdf, &out, title.as_deref()),
        Command::Slot { action } => run_slot(action),
        Command::AdminEmail { action } => run_admin_email(action),
        Command::Upload { file, dir } => run_upload(&file, &dir),
    }
}

fn run_synth(kind: &str, target: Option<&str>, out: &PathBuf, disposition: &str) -> Result<()> {
    let poc_kind = match kind {
        "script" => PocKind::Script,
        _ => PocKind::Link,
    };
    let document = synthesize(poc_kind, target)?;
    fs::write(out, &document.bytes)
        .with_context(|| format!("writing {}", out.display()))?;

    let disposition = match disposition {
        "attachment" => Disposition::Attachment,
        _ => Disposition::Inline,
    };
    // Header values the serving layer should attach to these bytes.
    println!("Content-Type: {PDF_CONTENT_TYPE}");
    println!("Content-Disposition: {}", disposition.header_value(&document.name));
    println!("Content-Security-Policy: {CSP_ISOLATED_ORIGIN}");
    info!(kind = document.kind.as_str(), bytes = document.bytes.len(), "PoC written");
    Ok(())
}

fn run_preview(pdf: &PathBuf, out: &PathBuf, title: Option<&str>) -> Result<()> {
    let bytes = fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let file_name = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf");
    let image = render_preview(&bytes, title.unwrap_or(file_name), file_name);
    let png = image.encode_png().context("encoding preview")?;
    fs::write(out, png).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

fn run_slot(action: SlotAction) -> Result<()> {
    let arbiter = AccessArbiter::new();
    match action {
        SlotAction::Put { slot, pdf, store, user, password } => {
            let session = arbiter.login(&user, &password)?;
            arbiter.authorize(&session, Role::Attacker)?;
            let slot = SlotId::new(slot)?;
            let store = SlotStore::open(store)?;
            let name = pdf
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.pdf")
                .to_string();
            if !slotbox_core::surface::allowed_upload(&name) {
                anyhow::bail!("file type not allowed: {name}");
            }
            let bytes = fs::read(&pdf).with_context(|| format!("reading {}", pdf.display()))?;
            store.put(slot, &Document { name, kind: DocumentKind::PlainUpload, bytes })?;
            println!("stored in slot {slot}");
            Ok(())
        }
        SlotAction::Delete { slot, store, user, password } => {
            let session = arbiter.login(&user, &password)?;
            arbiter.authorize(&session, Role::Attacker)?;
            let slot = SlotId::new(slot)?;
            SlotStore::open(store)?.delete(slot)?;
            println!("slot {slot} emptied");
            Ok(())
        }
        SlotAction::List { store } => {
            let store = SlotStore::open(store)?;
            for view in store.list() {
                println!(
                    "slot {}: document={} preview={}",
                    view.slot,
                    if view.has_document { "yes" } else { "-" },
                    if view.has_preview { "yes" } else { "-" },
                );
            }
            Ok(())
        }
    }
}

fn run_admin_email(action: AdminAction) -> Result<()> {
    let arbiter = AccessArbiter::new();
    match action {
        AdminAction::Get { state } => {
            let store = AdminConfigStore::open(state)?;
            println!("admin_email: {}", store.get()?.admin_email);
            Ok(())
        }
        AdminAction::Set { email, state, user, password } => {
            let session = arbiter.login(&user, &password)?;
            let store = AdminConfigStore::open(state)?;
            match change_email(RequestMethod::Post, &session, &arbiter, &store, Some(&email))? {
                EmailChangeOutcome::Changed { old, new } => {
                    println!("admin email changed from {old} to {new}");
                }
                EmailChangeOutcome::Form { .. } => unreachable!("POST never renders the form"),
            }
            Ok(())
        }
    }
}

fn run_upload(file: &PathBuf, dir: &PathBuf) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.pdf");
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let registry = UploadRegistry::open(dir)?;
    let stored = registry.store(name, &bytes)?;
    if slotbox_core::surface::has_risk_marker(&bytes) {
        println!("Riesgo de Seguridad");
    } else {
        println!("PDF cargado correctamente");
    }
    println!("stored at {}", stored.display());
    Ok(())
}
