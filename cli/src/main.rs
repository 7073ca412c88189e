//! KamposXestion CLI - binary entry point.
//!
//! A thin front-end over [`kampos_auth`]: it parses the command, runs one
//! guarded flow, and prints the localized outcome. Error text shown to the
//! user always comes from [`kampos_auth::AuthError::user_message`]; the
//! technical detail goes to the log.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use kampos_auth::AuthService;
use kampos_client::ClientManager;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "kampos", about = "Xestión de acceso de KamposXestion", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crear unha conta nova
    Register {
        #[arg(long)]
        email: String,
        /// Nome completo da persoa usuaria
        #[arg(long)]
        full_name: String,
        /// Contrasinal; pedirase por stdin se non se indica
        #[arg(long)]
        password: Option<String>,
    },
    /// Iniciar sesión
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Pechar a sesión actual
    Logout,
    /// Amosar o estado da sesión actual
    Status,
    /// Executar as probas de diagnóstico da conexión
    Debug,
    /// Reiniciar a conexión co servidor (consérvanse as credenciais)
    Reset,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let manager = Arc::new(ClientManager::new());
    let service = AuthService::new(Arc::clone(&manager));

    match cli.command {
        Command::Register {
            email,
            full_name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let outcome = service
                .register(&email, &password, &full_name)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;

            println!("Conta creada para {}", outcome.profile.email);
            if !outcome.profile_mirrored {
                println!("Aviso: non se puido gardar o perfil; crearase ao iniciar sesión.");
            }
            if outcome.session.is_some() {
                println!("Sesión iniciada automaticamente.");
            } else {
                println!("Agora debes iniciar sesión manualmente.");
            }
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let profile = service
                .sign_in(&email, &password)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;

            println!("Sesión iniciada correctamente.");
            print_profile(&profile);
        }
        Command::Logout => {
            service
                .sign_out()
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("Sesión pechada correctamente.");
        }
        Command::Status => match service.current_user().await {
            Some(profile) => {
                println!("Hai unha sesión activa.");
                print_profile(&profile);
            }
            None => println!("Non hai sesión activa."),
        },
        Command::Debug => {
            let status = kampos_auth::diagnostics::check_auth_status(&service).await;
            let sql = kampos_auth::diagnostics::check_sql_config(&service).await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            println!("{}", serde_json::to_string_pretty(&sql)?);
        }
        Command::Reset => {
            manager.reinitialize();
            println!("Conexión reiniciada correctamente.");
        }
    }

    Ok(())
}

fn print_profile(profile: &kampos_types::UserProfile) {
    println!("  correo: {}", profile.email);
    if let Some(name) = &profile.full_name {
        println!("  nome:   {name}");
    }
    println!("  rol:    {}", profile.role);
}

/// Reads the password from stdin when it was not given as a flag.
fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Contrasinal: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow!("O contrasinal non pode estar baleiro"));
    }
    Ok(password)
}
