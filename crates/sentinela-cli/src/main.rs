mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::Credentials;
use sentinela_auth::Role;

#[derive(Parser)]
#[command(name = "sentinela")]
#[command(about = "Credit risk dashboard: classification, ECL and limit propensity")]
#[command(version)]
struct Cli {
    /// Path to the Sentinela config directory (default: ~/.sentinela)
    #[arg(long, global = true, env = "SENTINELA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Matricula to log in with. Prompted for when a command needs it.
    #[arg(long, global = true, env = "SENTINELA_MATRICULA")]
    matricula: Option<String>,

    /// Password for --matricula (or set SENTINELA_PASSWORD).
    #[arg(long, global = true, env = "SENTINELA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Passphrase for encrypted credentials (or set SENTINELA_PASSPHRASE).
    #[arg(long, global = true, env = "SENTINELA_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the settings file, the database and the first administrator
    Init {
        /// Administrator display name
        #[arg(long, default_value = "Administrator")]
        admin_name: String,
        /// Administrator e-mail
        #[arg(long, default_value = "admin@localhost")]
        admin_email: String,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the role → permission table in effect
    Roles,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Inspect the audit log
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Check the PRINAD backend
    Health,

    /// Classify one client by CPF
    Classify {
        cpf: String,
        /// Include the feature contributions behind the score
        #[arg(long)]
        explain: bool,
    },

    /// Expected credit loss
    Ecl {
        #[command(subcommand)]
        action: EclAction,
    },

    /// Limit propensity
    Propensity {
        #[command(subcommand)]
        action: PropensityAction,
    },

    /// Classify a portfolio, compute its ECL and write a report
    Pipeline {
        /// JSON array of operations
        operations: PathBuf,
        /// Report destination (default: <config dir>/reports/portfolio-<date>.md)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Report title
        #[arg(long, default_value = "Portfolio ECL report")]
        title: String,
    },

    /// Run the HTTP API
    Serve,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print every setting (secrets masked)
    Show,
    /// Print one setting
    Get { key: String },
    /// Change one setting
    Set {
        key: String,
        value: String,
        /// Store the value encrypted under --passphrase (llm.api_key only)
        #[arg(long)]
        encrypt: bool,
    },
    /// Restore defaults, keeping the database path and JWT secret
    Reset,
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create an account
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Matricula of the new account
        #[arg(long = "user-matricula")]
        user_matricula: String,
        #[arg(long)]
        role: Role,
        /// Initial password of the new account; prompted when omitted
        #[arg(long = "user-password", env = "SENTINELA_NEW_USER_PASSWORD", hide_env_values = true)]
        user_password: Option<String>,
    },
    /// List accounts
    List,
}

#[derive(Subcommand)]
enum AuditAction {
    /// Print entries in insertion order
    List {
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Print every entry as CSV instead
        #[arg(long)]
        csv: bool,
    },
}

#[derive(Subcommand)]
enum EclAction {
    /// ECL from explicit PD, LGD and EAD
    Direct {
        #[arg(long)]
        pd: f64,
        #[arg(long)]
        lgd: f64,
        #[arg(long)]
        ead: f64,
        /// IFRS 9 stage (1-3)
        #[arg(long, default_value_t = 1)]
        stage: u8,
    },
    /// List homogeneous risk groups
    Groups,
}

#[derive(Subcommand)]
enum PropensityAction {
    /// List products with propensity models
    Products,
}

/// Use the CLI value when given, otherwise prompt on stdin.
pub fn prompt(label: &str, value: &Option<String>) -> anyhow::Result<String> {
    if let Some(v) = value {
        return Ok(v.clone());
    }
    use std::io::{self, Write};
    print!("{label}: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Like [`prompt`] but the typed value is not echoed.
pub fn prompt_secret(label: &str, value: &Option<String>) -> anyhow::Result<String> {
    if let Some(v) = value {
        return Ok(v.clone());
    }
    Ok(rpassword::prompt_password_stdout(&format!("{label}: "))?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("sentinela=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => sentinela_core::Settings::default_base_dir()?,
    };
    let creds = Credentials {
        matricula: cli.matricula.clone(),
        password: cli.password.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init {
            ref admin_name,
            ref admin_email,
        } => rt.block_on(commands::init::run(
            &base_dir,
            &creds,
            admin_name,
            admin_email,
        )),
        Commands::Config { ref action } => match action {
            ConfigAction::Show => commands::config::show(&base_dir),
            ConfigAction::Get { key } => commands::config::get(&base_dir, key),
            ConfigAction::Set {
                key,
                value,
                encrypt,
            } => commands::config::set(&base_dir, key, value, *encrypt, &cli.passphrase),
            ConfigAction::Reset => commands::config::reset(&base_dir),
        },
        Commands::Roles => commands::roles::run(&base_dir),
        Commands::Users { ref action } => match action {
            UsersAction::Add {
                name,
                email,
                user_matricula,
                role,
                user_password,
            } => {
                let password = prompt_secret("Password for the new account", user_password)?;
                rt.block_on(commands::users::add(
                    &base_dir,
                    &creds,
                    sentinela_auth::CreateUserRequest {
                        name: name.clone(),
                        email: email.clone(),
                        matricula: user_matricula.clone(),
                        role: *role,
                        password,
                    },
                ))
            }
            UsersAction::List => rt.block_on(commands::users::list(&base_dir, &creds)),
        },
        Commands::Audit {
            action: AuditAction::List { limit, offset, csv },
        } => rt.block_on(commands::audit::list(&base_dir, &creds, limit, offset, csv)),
        Commands::Health => rt.block_on(commands::health::run(&base_dir, &creds)),
        Commands::Classify { ref cpf, explain } => {
            rt.block_on(commands::classify::run(&base_dir, &creds, cpf, explain))
        }
        Commands::Ecl { ref action } => match *action {
            EclAction::Direct {
                pd,
                lgd,
                ead,
                stage,
            } => rt.block_on(commands::ecl::direct(&base_dir, &creds, pd, lgd, ead, stage)),
            EclAction::Groups => rt.block_on(commands::ecl::groups(&base_dir, &creds)),
        },
        Commands::Propensity {
            action: PropensityAction::Products,
        } => rt.block_on(commands::propensity::products(&base_dir, &creds)),
        Commands::Pipeline {
            ref operations,
            ref output,
            ref title,
        } => rt.block_on(commands::pipeline::run(
            &base_dir,
            &creds,
            operations,
            output.as_deref(),
            title,
        )),
        Commands::Serve => rt.block_on(commands::serve::run(&base_dir)),
    }
}
