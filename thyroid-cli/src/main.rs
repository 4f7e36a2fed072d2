//! 甲状腺摄碘率计算程序

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thyroid_admin::{ConfigManager, LoggingConfig, ThyroidConfig};
use thyroid_core::utils::parse_timestamp;
use thyroid_core::{PatientInfo, StudyInputs, TimePoint};
use thyroid_uptake::{
    format_report, StudySession, StudyValidator, UptakeCalculator, UptakeInterpretation,
    UptakeResult, ValidationResult,
};
use thyroid_worksheet::{file_name, TextRenderer, Worksheet, WorksheetRenderer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "thyroid-uptake")]
#[command(about = "I-131 甲状腺摄碘率计算与工作单生成")]
struct Args {
    /// 零时（标准源）时间，格式 YYYY-MM-DD HH:MM，或 now
    #[arg(long)]
    zero: Option<String>,

    /// 4小时测量时间，默认零时+4小时
    #[arg(long)]
    four_hour: Option<String>,

    /// 24小时测量时间，默认零时+24小时
    #[arg(long)]
    twenty_four_hour: Option<String>,

    /// 体模中的标准源计数 (cpm)
    #[arg(long, allow_negative_numbers = true)]
    phantom: Option<f64>,

    /// 零时本底计数 (cpm)
    #[arg(long, allow_negative_numbers = true)]
    background: Option<f64>,

    /// 4小时颈部计数 (cpm)
    #[arg(long = "neck-4", default_value_t = 0.0, allow_negative_numbers = true)]
    neck_4: f64,

    /// 4小时大腿计数 (cpm)
    #[arg(long = "thigh-4", default_value_t = 0.0, allow_negative_numbers = true)]
    thigh_4: f64,

    /// 24小时颈部计数 (cpm)
    #[arg(long = "neck-24", default_value_t = 0.0, allow_negative_numbers = true)]
    neck_24: f64,

    /// 24小时大腿计数 (cpm)
    #[arg(long = "thigh-24", default_value_t = 0.0, allow_negative_numbers = true)]
    thigh_24: f64,

    /// 患者姓名
    #[arg(long)]
    name: Option<String>,

    /// 病历号
    #[arg(long)]
    mrn: Option<String>,

    /// 出生日期
    #[arg(long)]
    dob: Option<String>,

    /// 性别
    #[arg(long)]
    sex: Option<String>,

    /// 开单医生
    #[arg(long)]
    physician: Option<String>,

    /// 技师
    #[arg(long)]
    technologist: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// 工作单输出目录，覆盖配置文件
    #[arg(long)]
    worksheet_dir: Option<PathBuf>,

    /// 输入验证失败时不输出结果
    #[arg(long)]
    strict: bool,

    /// 打印默认配置并退出
    #[arg(long)]
    print_default_config: bool,
}

/// JSON输出
#[derive(Serialize)]
struct JsonOutput<'a> {
    inputs: &'a StudyInputs,
    patient: &'a PatientInfo,
    result: &'a UptakeResult,
    interpretation: UptakeInterpretation,
    validation: &'a ValidationResult,
    report: &'a str,
}

/// 初始化日志，输出到stderr，stdout只保留结果
fn init_logging(logging: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let level = override_level.unwrap_or(&logging.level);
    let filter = EnvFilter::try_new(level).with_context(|| format!("无效的日志级别: {}", level))?;

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// 解析时间参数，`now` 表示当前时间
fn apply_timestamp(
    session: &mut StudySession,
    point: TimePoint,
    value: Option<&str>,
    now: NaiveDateTime,
) -> Result<()> {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("now") => session.set_now(point, now),
        Some(v) => session.set_timestamp(point, parse_timestamp(v)?),
        None => {}
    }
    Ok(())
}

/// 由命令行参数和配置构建检查会话
fn build_session(args: &Args, config: &ThyroidConfig, now: NaiveDateTime) -> Result<StudySession> {
    // 4小时和24小时的默认时间相对零时计算
    let anchor = match args.zero.as_deref() {
        Some(v) if !v.trim().eq_ignore_ascii_case("now") => parse_timestamp(v)?,
        _ => now,
    };
    let mut session = StudySession::new(anchor, config.session)?;

    apply_timestamp(&mut session, TimePoint::FourHour, args.four_hour.as_deref(), now)?;
    apply_timestamp(
        &mut session,
        TimePoint::TwentyFourHour,
        args.twenty_four_hour.as_deref(),
        now,
    )?;

    session.set_standard(
        args.phantom.unwrap_or(config.session.phantom_count),
        args.background.unwrap_or(config.session.background_count),
    );
    session.set_counts(TimePoint::FourHour, args.neck_4, args.thigh_4)?;
    session.set_counts(TimePoint::TwentyFourHour, args.neck_24, args.thigh_24)?;

    session.set_patient(PatientInfo {
        name: args.name.clone(),
        mrn: args.mrn.clone(),
        dob: args.dob.clone(),
        sex: args.sex.clone(),
        referring_physician: args.physician.clone(),
    });

    Ok(session)
}

fn log_validation(validation: &ValidationResult) {
    for warning in &validation.warnings {
        warn!("输入警告: {}", warning);
    }
    for err in &validation.errors {
        error!("输入错误: {}", err);
    }
}

/// 渲染并写入工作单
async fn write_worksheet(
    dir: &Path,
    report: &str,
    patient: &PatientInfo,
    config: &ThyroidConfig,
    technologist: Option<&str>,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let renderer = TextRenderer::new(config.worksheet.page_width)?;
    let worksheet = Worksheet::build(report, patient, now.date(), technologist);
    let bytes = renderer.render(&worksheet)?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("无法创建目录: {}", dir.display()))?;

    let path = dir.join(file_name(patient, renderer.extension()));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("无法写入工作单: {}", path.display()))?;

    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", ThyroidConfig::default().to_toml()?);
        return Ok(());
    }

    let manager = ConfigManager::new(args.config.as_deref())?;
    let config = manager.get_config().clone();

    // 初始化日志
    init_logging(&config.logging, args.log_level.as_deref())?;

    info!("开始计算甲状腺摄碘率...");

    let now = Local::now().naive_local();
    let session = build_session(&args, &config, now)?;
    let inputs = session.inputs();

    let validation = StudyValidator::new().validate(&inputs);
    log_validation(&validation);
    if args.strict {
        validation.clone().into_result()?;
    }

    let result = UptakeCalculator::default().compute(&inputs);
    let report = format_report(&inputs, &result);
    let interpretation = UptakeInterpretation::from_result(&result);

    info!(
        "摄碘率: 4小时 {:?}, 24小时 {:?}",
        interpretation.four_hour, interpretation.twenty_four_hour
    );

    match args.format {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => {
            let output = JsonOutput {
                inputs: &inputs,
                patient: session.patient(),
                result: &result,
                interpretation,
                validation: &validation,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    let worksheet_dir = args
        .worksheet_dir
        .clone()
        .or_else(|| config.worksheet.output_dir.as_ref().map(PathBuf::from));

    if let Some(dir) = worksheet_dir {
        let technologist = args
            .technologist
            .as_deref()
            .or(config.worksheet.technologist.as_deref());

        match write_worksheet(&dir, &report, session.patient(), &config, technologist, now).await {
            Ok(path) => info!("工作单已保存: {}", path.display()),
            Err(e) => {
                error!("工作单保存失败: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
