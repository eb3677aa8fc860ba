//! linktree — command-line front end for the link tree engine.
//!
//! Usage: `linktree <command> [args]`. Run `linktree help` for the list.
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=linktree=debug`).

use std::env;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use linktree::database::Database;
use linktree::managers::link_tree_manager::{LinkTreeManager, LinkTreeManagerTrait};
use linktree::managers::tree_store::SqliteTreeStore;
use linktree::services::file_binding::LocalFileHandle;
use linktree::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linktree::services::url_hint::looks_like_url;
use linktree::types::link_tree::{tree_stats, FolderNode};

type Session = LinkTreeManager<SqliteTreeStore>;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");

    match run(command, &args[1.min(args.len())..]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(command: &str, rest: &[String]) -> Result<(), String> {
    if command == "help" || command == "--help" || command == "-h" {
        print_help();
        return Ok(());
    }

    let mut session = open_session()?;
    session.load().map_err(|e| e.to_string())?;

    match command {
        "show" => {
            session.set_search_query(&rest.join(" "));
            print_tree(&session.visible_tree());
        }
        "export" => print!("{}", session.export_text()),
        "export-json" => println!("{}", session.export_json().map_err(|e| e.to_string())?),
        "import" => {
            let text = read_arg_file(rest)?;
            let skipped = session.import_text(&text).map_err(|e| e.to_string())?;
            if skipped > 0 {
                println!("  ignored {} unrecognised lines", skipped);
            }
            save(&mut session)?;
        }
        "import-json" => {
            let text = read_arg_file(rest)?;
            let dropped = session.import_json(&text).map_err(|e| e.to_string())?;
            if dropped > 0 {
                println!("  dropped {} malformed entries", dropped);
            }
            save(&mut session)?;
        }
        "sort" => {
            session.sort_all();
            save(&mut session)?;
        }
        "prune" => {
            let removed = session.prune_empty();
            println!("  removed {} empty folders", removed);
            save(&mut session)?;
        }
        "restore" => {
            if !session.restore_from_backup().map_err(|e| e.to_string())? {
                println!("  no backup available");
                return Ok(());
            }
            save(&mut session)?;
        }
        "demo" => demo(&mut session)?,
        other => return Err(format!("unknown command '{}', try 'linktree help'", other)),
    }
    Ok(())
}

fn print_help() {
    println!("linktree v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  show [query]        print the tree, optionally filtered");
    println!("  export              print the tree in text form");
    println!("  export-json         print the tree as JSON");
    println!("  import <file>       replace the tree from a text export");
    println!("  import-json <file>  replace the tree from a JSON file");
    println!("  sort                sort folders and links by title");
    println!("  prune               remove empty folders");
    println!("  restore             bring back the tree from before the last save");
    println!("  demo                add a few sample folders and links");
}

fn open_session() -> Result<Session, String> {
    let mut settings_engine = SettingsEngine::new(env::var("LINKTREE_CONFIG").ok());
    let settings = settings_engine.load().map_err(|e| e.to_string())?;

    let db_path = settings_engine.database_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let db = Database::open(&db_path).map_err(|e| e.to_string())?;
    let store = SqliteTreeStore::with_keys(
        Arc::new(db),
        &settings.storage.tree_key,
        &settings.storage.backup_key,
    );

    let mut session = LinkTreeManager::with_settings(store, settings.editor.clone());
    if let Some(path) = &settings.storage.bound_file {
        session.bind_file(Box::new(LocalFileHandle::new(path)));
    }
    Ok(session)
}

fn read_arg_file(rest: &[String]) -> Result<String, String> {
    let path = rest.first().ok_or("missing file argument")?;
    fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))
}

fn save(session: &mut Session) -> Result<(), String> {
    session.save().map_err(|e| e.to_string())?;
    let (folders, links) = tree_stats(session.tree());
    println!("  ✓ saved {} folders, {} links", folders, links);
    Ok(())
}

fn print_tree(tree: &[FolderNode]) {
    fn walk(folder: &FolderNode, depth: usize) {
        let indent = "  ".repeat(depth);
        println!("{}📁 {}", indent, folder.title);
        for link in &folder.links {
            let flag = if looks_like_url(&link.url) { "" } else { "  ⚠" };
            println!("{}  🔗 {} <{}>{}", indent, link.title, link.url, flag);
        }
        for child in &folder.children {
            walk(child, depth + 1);
        }
    }
    if tree.is_empty() {
        println!("  (empty)");
    }
    for root in tree {
        walk(root, 0);
    }
}

fn demo(session: &mut Session) -> Result<(), String> {
    let work = session
        .add_folder(None, "Work")
        .ok_or("could not add root folder")?;
    session.add_link(&work, "Mail", "https://mail.example");
    let docs = session
        .add_folder(Some(work.as_str()), "Docs")
        .ok_or("could not add sub-folder")?;
    session.add_link(&docs, "Rust Book", "https://doc.rust-lang.org/book/");
    let home = session
        .add_folder(None, "Home")
        .ok_or("could not add root folder")?;
    session.add_link(&home, "News", "https://news.example");
    save(session)?;
    print_tree(session.tree());
    Ok(())
}
