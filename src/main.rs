// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INBOX ASSISTANT CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Processa uma mensagem e imprime o registro como JSON.
//
// Uso:
//   inbox-assistant-cli "URGENT: Production Database Down ..."
//   cat email.txt | inbox-assistant-cli
//   inbox-assistant-cli --evaluate [evaluation_results.json]
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use inbox_assistant::evaluation::{evaluate_system, export_results, SAMPLE_MESSAGES};
use inbox_assistant::llm::create_llm_client;
use inbox_assistant::{load_assistant_config, load_llm_config, InboxAssistant, LlmConfig};
use std::io::Read;
use std::path::PathBuf;

const DEFAULT_RESULTS_PATH: &str = "evaluation_results.json";

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [
        PathBuf::from(".env"),
        PathBuf::from("../.env"),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env"),
    ];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or(path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    if dotenvy::dotenv().is_err() {
        eprintln!("⚠ Nenhum arquivo .env encontrado. Usando variáveis de ambiente.");
    }
}

fn print_key_hint(config: &LlmConfig) {
    let var = config.provider.api_key_var();
    eprintln!();
    eprintln!("Certifique-se de que:");
    eprintln!("  1. O arquivo .env existe no diretório do projeto");
    eprintln!("  2. O arquivo contém: {}=sua-chave-aqui", var);
    eprintln!();
    eprintln!("Ou defina a variável de ambiente diretamente:");
    eprintln!("  export {}=sua-chave-aqui", var);
}

fn read_message(args: &[String]) -> anyhow::Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Falha ao ler a mensagem do stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Inbox Assistant CLI v{}", inbox_assistant::VERSION);
        eprintln!();
        eprintln!("Uso: inbox-assistant-cli [mensagem]");
        eprintln!("     inbox-assistant-cli --evaluate [arquivo.json]");
        eprintln!();
        eprintln!("Sem argumentos, a mensagem é lida do stdin.");
        return Ok(());
    }

    let llm_config = load_llm_config();
    let llm = match create_llm_client(&llm_config) {
        Ok(llm) => llm,
        Err(e) => {
            eprintln!("✗ Erro: {}", e);
            print_key_hint(&llm_config);
            std::process::exit(1);
        }
    };

    let assistant = InboxAssistant::new(llm).with_config(load_assistant_config());

    if args.first().map(String::as_str) == Some("--evaluate") {
        let path = args
            .get(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH));

        let report = evaluate_system(&assistant, &SAMPLE_MESSAGES).await;
        println!("{}", report);
        export_results(&report, &path)?;
        return Ok(());
    }

    let message = read_message(&args)?;
    if message.trim().is_empty() {
        anyhow::bail!("Mensagem vazia: passe o texto como argumento ou via stdin");
    }

    match assistant.process(&message).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Erro ao processar mensagem: {}", e);
            print_key_hint(&llm_config);
            Err(e.into())
        }
    }
}
