use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // API keys are deliberately left off this list
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "UPG_HOST",
        "UPG_PORT",
        "UPG_DATABASE_URL",
        "UPG_DEPOSIT_ADDRESS",
        "UPG_DEPOSIT_NETWORK",
        "UPG_MURAL_ACCOUNT_ID",
        "UPG_MURAL_API_URL",
        "UPG_MURAL_TIMEOUT",
        "UPG_WEBHOOK_PUBLIC_KEY",
        "UPG_SEED_CATALOG",
        "UPG_PAYOUT_RECOVERY_INTERVAL",
        "UPG_PAYOUT_FIRST_NAME",
        "UPG_PAYOUT_LAST_NAME",
        "UPG_PAYOUT_EMAIL",
        "UPG_PAYOUT_BANK_NAME",
        "UPG_PAYOUT_BANK_ACCOUNT_OWNER",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
