use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hipoteca",
    version,
    about = "Terminal client for the mortgage analysis service"
)]
pub(crate) struct Args {
    #[arg(long, default_value = "config/hipoteca.toml")]
    pub(crate) config: PathBuf,
    /// Backend origin, e.g. http://localhost:8000.
    #[arg(long, env = "HIPOTECA_API")]
    pub(crate) base_url: Option<String>,
    #[arg(long)]
    pub(crate) state_dir: Option<PathBuf>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    /// Forget the stored session id and start a new one.
    #[arg(long, default_value_t = false)]
    pub(crate) new_session: bool,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Interactive form, results and chat (default).
    Tui,
    /// Run one analysis, optionally followed by questions, and print it.
    Analyze(AnalyzeArgs),
    /// Query the document index directly.
    Search(SearchArgs),
    /// Print the backend health status.
    Health,
}

#[derive(ClapArgs, Debug, Default)]
pub(crate) struct AnalyzeArgs {
    #[arg(long)]
    pub(crate) capital: String,
    #[arg(long)]
    pub(crate) anos: String,
    #[arg(long, default_value = "fijo")]
    pub(crate) tipo: String,
    #[arg(long)]
    pub(crate) tin: Option<String>,
    #[arg(long)]
    pub(crate) euribor: Option<String>,
    #[arg(long)]
    pub(crate) diferencial: Option<String>,
    #[arg(long)]
    pub(crate) cuota_actual: Option<String>,
    #[arg(long)]
    pub(crate) ingresos: Option<String>,
    #[arg(long)]
    pub(crate) otras_deudas: Option<String>,
    #[arg(long)]
    pub(crate) valor_vivienda: Option<String>,
    #[arg(long)]
    pub(crate) oferta_tin: Option<String>,
    /// Question for the assistant after the analysis; repeatable.
    #[arg(long = "ask")]
    pub(crate) questions: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub(crate) struct SearchArgs {
    pub(crate) query: String,
    #[arg(long, default_value_t = 5)]
    pub(crate) top_k: u32,
    #[arg(long)]
    pub(crate) banco: Option<String>,
    #[arg(long, default_value_t = 0.15)]
    pub(crate) min_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let args = Args::try_parse_from(["hipoteca"]).expect("parse");
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from("config/hipoteca.toml"));
        assert!(!args.new_session);
    }

    #[test]
    fn analyze_collects_repeated_questions() {
        let args = Args::try_parse_from([
            "hipoteca",
            "--base-url",
            "http://127.0.0.1:9000",
            "analyze",
            "--capital",
            "150000",
            "--anos",
            "20",
            "--tin",
            "3,5",
            "--ask",
            "¿Me conviene amortizar?",
            "--ask",
            "¿Y subrogar?",
        ])
        .expect("parse");
        assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        let Some(Command::Analyze(analyze)) = args.command else {
            panic!("expected analyze");
        };
        assert_eq!(analyze.tipo, "fijo");
        assert_eq!(analyze.tin.as_deref(), Some("3,5"));
        assert_eq!(analyze.questions.len(), 2);
    }

    #[test]
    fn search_takes_positional_query() {
        let args = Args::try_parse_from(["hipoteca", "search", "comisión", "--top-k", "3"])
            .expect("parse");
        let Some(Command::Search(search)) = args.command else {
            panic!("expected search");
        };
        assert_eq!(search.query, "comisión");
        assert_eq!(search.top_k, 3);
        assert!(search.banco.is_none());
    }
}
