//! prdkit — AI策划案写作助手 command line.
//!
//! Each subcommand drives one feature pipeline against the configured
//! backend and renders the streaming output to the terminal. Ctrl-C sets
//! the cooperative cancellation flag; partial output is kept.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, Result};
use colored::Colorize;
use prd_core::backend::{Backend, GeminiCliBackend};
use prd_core::chat::follow_up;
use prd_core::config::load_config;
use prd_core::engine::{StreamingEngine, CURSOR_MARKER};
use prd_core::export::{create_workbook, XLSX_MIME};
use prd_core::extract::{PlainTextExtractor, TextExtractor};
use prd_core::history::record_summary;
use prd_core::init::{generate_prd_kit_structure, InitOptions};
use prd_core::pipeline::{
    AttachmentText, GenerateController, OptimizeController, RunOutcome, SingleShotController,
    SingleShotInput,
};
use prd_core::session::SessionContext;
use prd_protocol::{DownloadBlob, FeatureKind, UiEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "prdkit", version, about = "AI策划案写作助手")]
struct Cli {
    /// 覆盖配置中的模型
    #[arg(long, global = true)]
    model: Option<String>,

    /// 显示模型思考过程
    #[arg(long, global = true)]
    show_thinking: bool,

    /// 完成后进入追问模式（逐行输入，空行退出）
    #[arg(long, global = true)]
    interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 初始化 .prd-kit 项目目录
    Init {
        /// 覆盖已存在的 .prd-kit 目录
        #[arg(long)]
        force: bool,

        /// 仅生成 config.toml
        #[arg(long)]
        minimal: bool,
    },

    /// 生成策划案（生成 + 复检清单自检）
    Generate {
        /// 功能描述
        description: Option<String>,

        /// 从文件读取功能描述
        #[arg(long, conflicts_with = "description")]
        input_file: Option<PathBuf>,

        /// 附件（txt/md，内容并入提示词）
        #[arg(long)]
        attach: Option<PathBuf>,

        /// 导出为表格文件
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// 优化策划案（初始修正 + 反思循环 + 复检）
    Optimize {
        /// 旧策划案文件
        #[arg(long)]
        prd: PathBuf,

        /// 修改意见
        #[arg(long, default_value = "")]
        feedback: String,

        /// 参考附件（txt/md）
        #[arg(long)]
        attach: Option<PathBuf>,

        /// 反思迭代轮次（1-10）
        #[arg(long, default_value_t = 3)]
        rounds: u32,

        /// 导出为表格文件
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// 汇报助手：将碎片信息转为结构化汇报
    Report {
        /// 当前问题
        #[arg(long)]
        problem: String,

        /// 解决方案
        #[arg(long)]
        solution: String,

        /// 预期结果
        #[arg(long)]
        result: String,
    },

    /// 周报助手：将日报汇总为周报
    Weekly {
        /// 本周日报内容
        daily_logs: Option<String>,

        /// 从文件读取日报内容
        #[arg(long, conflicts_with = "daily_logs")]
        input_file: Option<PathBuf>,
    },

    /// 白皮书助手：扩写功能关键词
    Whitepaper {
        /// 功能关键词
        keyword: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Init { force, minimal } = &cli.command {
        let written = generate_prd_kit_structure(InitOptions {
            target_dir: PathBuf::from("."),
            force: *force,
            minimal: *minimal,
        })
        .await?;
        for path in &written {
            println!("{} {}", "已生成".green(), path.display());
        }
        return Ok(());
    }

    let config = load_config(Path::new(".")).await?;
    let mut session = SessionContext::from_config(&config);
    if let Some(model) = cli.model.clone() {
        session.model_id = model;
    }

    let backend = Arc::new(GeminiCliBackend::new());
    if !backend.check_availability().await {
        bail!("后端不可用：请确认 gemini-cli 已安装且 GEMINI_API_KEY 已设置");
    }
    let engine = StreamingEngine::new(backend);

    let (ui_tx, ui_rx) = mpsc::channel(256);
    let printer = spawn_ui_printer(ui_rx, cli.show_thinking);
    let _canceller = spawn_cancel_handler(session.cancel.clone());

    let feature = run_command(&cli.command, &engine, &mut session, &ui_tx).await?;

    if cli.interactive {
        if let Some((kind, output)) = feature {
            interactive_chat(&engine, &mut session, kind, &output, &ui_tx).await?;
        }
    }

    drop(ui_tx);
    let _ = printer.await;
    Ok(())
}

/// Run one feature command. Returns the feature kind and finished output
/// when a follow-up conversation is possible.
async fn run_command(
    command: &Command,
    engine: &StreamingEngine,
    session: &mut SessionContext,
    ui_tx: &mpsc::Sender<UiEvent>,
) -> Result<Option<(FeatureKind, String)>> {
    match command {
        Command::Init { .. } => unreachable!("handled before session setup"),

        Command::Generate {
            description,
            input_file,
            attach,
            export,
        } => {
            let description = read_input(description.as_deref(), input_file.as_deref())?;
            let attachment = attach.as_deref().map(read_attachment).transpose()?;

            let mut controller = GenerateController::new();
            let outcome = controller
                .submit(engine, session, &description, attachment.as_ref(), ui_tx)
                .await?;
            report_outcome(&outcome);

            let download = export_document(
                controller.document(),
                controller.check_report(),
                export.as_deref(),
            )?;
            controller.record_history(&mut session.history, download);
            print_history_note(session);

            Ok(Some((
                FeatureKind::GeneratePrd,
                controller.document().to_string(),
            )))
        }

        Command::Optimize {
            prd,
            feedback,
            attach,
            rounds,
            export,
        } => {
            let old_prd = std::fs::read_to_string(prd)
                .map_err(|e| eyre!("无法读取旧策划案 {}: {e}", prd.display()))?;
            let attachment = attach.as_deref().map(read_attachment).transpose()?;

            let mut controller = OptimizeController::new();
            let outcome = controller
                .submit(
                    engine,
                    session,
                    &old_prd,
                    feedback,
                    attachment.as_ref(),
                    *rounds,
                    ui_tx,
                )
                .await?;
            report_outcome(&outcome);
            eprintln!(
                "{}",
                format!("完成 {} 轮反思迭代", controller.rounds_completed()).dimmed()
            );

            let download = export_document(
                controller.document(),
                controller.check_report(),
                export.as_deref(),
            )?;
            controller.record_history(&mut session.history, download);
            print_history_note(session);

            Ok(Some((
                FeatureKind::OptimizePrd,
                controller.document().to_string(),
            )))
        }

        Command::Report {
            problem,
            solution,
            result,
        } => {
            run_single_shot(
                engine,
                session,
                SingleShotInput::Report {
                    problem: problem.clone(),
                    solution: solution.clone(),
                    expected: result.clone(),
                },
                ui_tx,
            )
            .await
        }

        Command::Weekly {
            daily_logs,
            input_file,
        } => {
            let daily_logs = read_input(daily_logs.as_deref(), input_file.as_deref())?;
            run_single_shot(
                engine,
                session,
                SingleShotInput::Weekly { daily_logs },
                ui_tx,
            )
            .await
        }

        Command::Whitepaper { keyword } => {
            run_single_shot(
                engine,
                session,
                SingleShotInput::Whitepaper {
                    keyword: keyword.clone(),
                },
                ui_tx,
            )
            .await
        }
    }
}

async fn run_single_shot(
    engine: &StreamingEngine,
    session: &mut SessionContext,
    input: SingleShotInput,
    ui_tx: &mpsc::Sender<UiEvent>,
) -> Result<Option<(FeatureKind, String)>> {
    let kind = input.kind();
    let mut controller = SingleShotController::new(kind);
    let outcome = controller.submit(engine, session, input, ui_tx).await?;
    report_outcome(&outcome);

    controller.record_history(&mut session.history, None);
    print_history_note(session);

    Ok(Some((kind, controller.output().to_string())))
}

/// Read input text from an argument or a file (exactly one is required).
fn read_input(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(text), None) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| eyre!("无法读取输入文件 {}: {e}", path.display())),
        _ => bail!("请提供输入内容或 --input-file 文件"),
    }
}

fn read_attachment(path: &Path) -> Result<AttachmentText> {
    let bytes =
        std::fs::read(path).map_err(|e| eyre!("无法读取附件 {}: {e}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_string();
    let content = PlainTextExtractor.extract(&bytes, &name);
    Ok(AttachmentText { name, content })
}

/// Export the finished document, returning the blob for history.
fn export_document(
    document: &str,
    check_report: Option<&str>,
    export: Option<&Path>,
) -> Result<Option<DownloadBlob>> {
    if document.is_empty() {
        return Ok(None);
    }
    let Some(path) = export else {
        return Ok(None);
    };

    let bytes = create_workbook(document, check_report)?;
    std::fs::write(path, &bytes).map_err(|e| eyre!("无法写入 {}: {e}", path.display()))?;
    eprintln!("{} {}", "已导出".green(), path.display());

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("策划案.xlsx")
        .to_string();
    Ok(Some(DownloadBlob {
        data: bytes,
        filename,
        mime: XLSX_MIME.to_string(),
    }))
}

fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed => eprintln!("{}", "✓ 完成".green()),
        RunOutcome::Cancelled => eprintln!("{}", "⏹️ 已中止，保留部分结果".yellow()),
        RunOutcome::Failed(error) => eprintln!("{}", format!("✗ 失败: {error}").red()),
    }
}

fn print_history_note(session: &SessionContext) {
    if let Some(record) = session.history.latest() {
        eprintln!(
            "{}",
            format!("#{} {}", record.id, record_summary(record)).dimmed()
        );
    }
}

/// Follow-up loop: one line per question, empty line exits.
async fn interactive_chat(
    engine: &StreamingEngine,
    session: &mut SessionContext,
    kind: FeatureKind,
    finished_output: &str,
    ui_tx: &mpsc::Sender<UiEvent>,
) -> Result<()> {
    if finished_output.is_empty() {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{}", "💬 追问> ".cyan());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }

        let reply = follow_up(engine, session, kind, finished_output, &line, ui_tx).await?;
        if let Some(error) = reply.error {
            eprintln!("{}", format!("✗ {error}").red());
        }
    }
    Ok(())
}

/// Print UI events to the terminal as they arrive.
fn spawn_ui_printer(
    mut ui_rx: mpsc::Receiver<UiEvent>,
    show_thinking: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Length of the answer prefix already printed for the current call.
        let mut printed = 0usize;

        while let Some(event) = ui_rx.recv().await {
            match event {
                UiEvent::Answer { text } => {
                    let body = text.strip_suffix(CURSOR_MARKER).unwrap_or(&text);
                    if body.len() < printed {
                        // A retry started the answer over.
                        println!();
                        printed = 0;
                    }
                    print!("{}", &body[printed..]);
                    use std::io::Write;
                    let _ = std::io::stdout().flush();
                    printed = body.len();
                }
                UiEvent::AnswerComplete { text } => {
                    if text.len() > printed {
                        print!("{}", &text[printed..]);
                    }
                    println!();
                    printed = 0;
                }
                UiEvent::Reasoning { text } => {
                    if show_thinking {
                        eprint!("\r{}", format!("💭 {} 字", text.chars().count()).dimmed());
                    }
                }
                UiEvent::Notice { text } => eprintln!("{}", text.yellow()),
                UiEvent::Failure { text } => eprintln!("{}", text.red()),
                UiEvent::StageStarted { name } => {
                    printed = 0;
                    eprintln!("{}", format!("▶ {name}").dimmed());
                }
                UiEvent::StageFinished { .. } => {}
                UiEvent::RoundStarted { index } => {
                    eprintln!("{}", format!("🔄 第 {index} 轮迭代").cyan());
                }
            }
        }
    })
}

/// First Ctrl-C requests cooperative cancellation of the current stream.
fn spawn_cancel_handler(cancel: prd_core::engine::CancelFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            cancel.set();
            eprintln!("{}", "正在中止...".yellow());
        }
    })
}
