//! Command-line access to a dealer database.
//!
//! # Responsibility
//! - Expose list/get/create/patch over `DealerService` for local inspection.
//! - Print dealers as JSON on stdout, errors on stderr.
//!
//! Usage: `dealer_cli <db-path> list | get <id> | create <json> | patch <id> <json>`
//!
//! Set `DEALER_LOG_DIR` to an absolute path to enable file logging.

use dealer_core::{
    default_log_level, init_logging, AppError, AppResult, Dealer, DealerPatch, DealerService,
    LogSettings, SqlDealerStore, SqlSettings, SqlStore,
};
use std::process::ExitCode;

const USAGE: &str =
    "usage: dealer_cli <db-path> list | get <id> | create <json> | patch <id> <json>";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("DEALER_LOG_DIR") {
        if let Err(err) = init_logging(&LogSettings::new(default_log_level(), log_dir)) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((db_path, command)) = args.split_first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let store = match SqlStore::open(&SqlSettings::file(db_path)) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let service = match SqlDealerStore::try_new(&store) {
        Ok(dealers) => DealerService::new(dealers),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let output = match command {
        [cmd] if cmd == "list" => service.get_all_dealers().map(|dealers| {
            dealers
                .iter()
                .map(Dealer::to_json)
                .collect::<Vec<_>>()
                .join("\n")
        }),
        [cmd, id] if cmd == "get" => service.get_dealer(id).map(|dealer| dealer.to_json()),
        [cmd, json] if cmd == "create" => create(&service, json),
        [cmd, id, json] if cmd == "patch" => patch(&service, id, json),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match output {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} ({})", err, err.status_code);
            ExitCode::FAILURE
        }
    }
}

fn create(service: &DealerService<SqlDealerStore<'_>>, json: &str) -> AppResult<String> {
    let Some(dealer) = Dealer::from_json(json.as_bytes()) else {
        return Err(invalid_json("dealer_cli.Create"));
    };
    service.create_dealer(dealer).map(|created| created.to_json())
}

fn patch(service: &DealerService<SqlDealerStore<'_>>, id: &str, json: &str) -> AppResult<String> {
    let Some(patch) = DealerPatch::from_json(json.as_bytes()) else {
        return Err(invalid_json("dealer_cli.Patch"));
    };
    service
        .patch_dealer(id, &patch)
        .map(|update| update.new.to_json())
}

fn invalid_json(location: &'static str) -> AppError {
    AppError::bad_request(location, "cli.invalid_json.app_error", "input is not valid JSON")
}
