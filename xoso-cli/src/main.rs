mod display;
mod import;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use xoso_db::db::{
    count_draws, db_path, fetch_draw, fetch_draws, fetch_last_draws, load_prediction, migrate,
    open_db, save_prediction,
};
use xoso_db::models::Prediction;
use xoso_db::rusqlite::Connection;
use xoso_engine::backtest::{run_backtest, DrawInput};
use xoso_engine::config::{load_config, EngineConfig};
use xoso_engine::worker::{
    decode_message, handle_request, AnalyzeRequest, CheckRequest, Request, Response, Worker,
};

use crate::display::{
    display_analysis, display_backtest, display_check, display_core_numbers, display_draws,
    display_import_summary, display_strategy, display_xien3,
};
use crate::import::{import_table, read_table, resolve_date};

#[derive(Parser)]
#[command(name = "xoso", about = "Phân tích bảng Đầu/Đuôi xổ số miền Bắc và gợi ý xiên 3")]
struct Cli {
    /// Tệp cấu hình JSON của bộ phân tích
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lưu bảng Đầu/Đuôi của một kỳ quay
    Import {
        /// Tệp chứa bảng (dùng "-" để đọc từ stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Ngày quay (DD/MM/YYYY hoặc YYYY-MM-DD, mặc định hôm nay)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Hiển thị đường dẫn cơ sở dữ liệu
    DbPath,

    /// Liệt kê các kỳ quay đã lưu
    List {
        /// Số kỳ hiển thị
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Phân tích một kỳ và tạo số nòng cốt + xiên 3
    Analyze {
        /// Tệp chứa bảng (bỏ trống để dùng kỳ đã lưu theo --date)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Ngày quay (DD/MM/YYYY hoặc YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Phiên lưu dự đoán
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Xuất JSON thay vì bảng
        #[arg(long)]
        json: bool,
    },

    /// Đối chiếu kết quả thật với dự đoán đã lưu
    Check {
        /// Tệp chứa bảng kết quả (dùng "-" để đọc từ stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Phiên chứa dự đoán
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Xuất JSON thay vì bảng
        #[arg(long)]
        json: bool,
    },

    /// Chạy lại chiến lược trên các kỳ đã lưu
    Backtest {
        /// Chỉ dùng N kỳ gần nhất
        #[arg(short, long)]
        last: Option<u32>,
    },

    /// Nhận yêu cầu JSON từng dòng trên stdin, trả lời trên stdout
    Serve,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Serve => cmd_serve(config),
        command => run_with_db(command, &config),
    }
}

fn run_with_db(command: Command, config: &EngineConfig) -> Result<()> {
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match command {
        Command::Import { file, date } => cmd_import(&conn, &file, date.as_deref()),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Analyze {
            file,
            date,
            session,
            json,
        } => cmd_analyze(&conn, config, file.as_deref(), date.as_deref(), &session, json),
        Command::Check {
            file,
            session,
            json,
        } => cmd_check(&conn, config, &file, &session, json),
        Command::Backtest { last } => cmd_backtest(&conn, config, last),
        Command::Serve => cmd_serve(config.clone()),
    }
}

fn cmd_import(conn: &Connection, file: &Path, date: Option<&str>) -> Result<()> {
    let draw_date = resolve_date(date)?;
    let raw = read_table(file)?;
    let result = import_table(conn, &raw, &draw_date)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Chưa có dữ liệu. Chạy trước : xoso import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_analyze(
    conn: &Connection,
    config: &EngineConfig,
    file: Option<&Path>,
    date: Option<&str>,
    session: &str,
    json: bool,
) -> Result<()> {
    let (raw_data, draw_date) = match file {
        Some(file) => {
            let draw_date = resolve_date(date)?;
            let raw = read_table(file)?;
            (raw, draw_date)
        }
        None => {
            let Some(date) = date else {
                bail!("Cần --file hoặc --date của một kỳ đã lưu");
            };
            let draw_date = resolve_date(Some(date))?;
            let stored = fetch_draw(conn, &draw_date)?
                .with_context(|| format!("Không có kỳ {draw_date} trong cơ sở dữ liệu"))?;
            (stored.raw_data, draw_date)
        }
    };

    let request = Request::AnalyzeData(AnalyzeRequest {
        raw_data: raw_data.clone(),
        draw_date: draw_date.clone(),
    });
    let response = match handle_request(config, request) {
        Response::AnalysisComplete(response) => response,
        Response::Error(message) => bail!("{message}"),
        other => bail!("Phản hồi không mong đợi : {:?}", other),
    };

    if file.is_some() {
        import_table(conn, &raw_data, &draw_date)?;
    }
    save_prediction(
        conn,
        &Prediction {
            session: session.to_string(),
            draw_date,
            core_numbers: response.core_numbers.clone(),
            xien3_sets: response.xien3_sets.clone(),
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    display_analysis(&response.analysis);
    display_strategy(&response.strategy);
    display_core_numbers(&response.core_numbers);
    display_xien3(&response.xien3_sets);
    println!("\nĐã lưu dự đoán vào phiên '{session}'.");
    Ok(())
}

fn cmd_check(
    conn: &Connection,
    config: &EngineConfig,
    file: &Path,
    session: &str,
    json: bool,
) -> Result<()> {
    let prediction = load_prediction(conn, session)?.with_context(|| {
        format!("Chưa có dự đoán cho phiên '{session}'. Chạy trước : xoso analyze")
    })?;
    let actual_raw_data = read_table(file)?;

    let predicted_sets = prediction.xien3_sets.len();
    let request = Request::CheckResults(CheckRequest {
        actual_raw_data,
        predicted_core_numbers: prediction.core_numbers,
        predicted_xien3_sets: prediction.xien3_sets,
    });
    let result = match handle_request(config, request) {
        Response::CheckResultsComplete(result) => result,
        Response::Error(message) => bail!("{message}"),
        other => bail!("Phản hồi không mong đợi : {:?}", other),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Dự đoán từ kỳ {} (phiên '{session}')", prediction.draw_date);
    display_check(&result, predicted_sets);
    Ok(())
}

fn cmd_backtest(conn: &Connection, config: &EngineConfig, last: Option<u32>) -> Result<()> {
    let draws = match last {
        Some(n) => {
            let mut recent = fetch_last_draws(conn, n)?;
            recent.reverse();
            recent
        }
        None => fetch_draws(conn)?,
    };
    if draws.len() < 2 {
        bail!("Cần ít nhất 2 kỳ đã lưu. Chạy trước : xoso import");
    }

    let inputs: Vec<DrawInput> = draws
        .into_iter()
        .map(|d| DrawInput {
            draw_date: d.draw_date,
            raw_data: d.raw_data,
        })
        .collect();

    println!("Kiểm tra lại trên {} kỳ...", inputs.len());
    let pb = ProgressBar::new((inputs.len() - 1) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Mẫu thanh tiến trình không hợp lệ")?
            .progress_chars("=> "),
    );

    let report = run_backtest(config, &inputs, || pb.inc(1))?;
    pb.finish_and_clear();

    display_backtest(&report);
    Ok(())
}

fn cmd_serve(config: EngineConfig) -> Result<()> {
    let worker = Worker::spawn(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Lỗi đọc stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match decode_message(&line) {
            Ok(request) => worker.request(request)?,
            Err(response) => response,
        };
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }

    log::info!("stdin closed, worker stopping");
    Ok(())
}
