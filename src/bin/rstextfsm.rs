//! rstextfsm 命令行工具
//!
//! 用法：
//!   rstextfsm parse <模板> <输入> [--format json|yaml|table]   - 用模板解析一份原始输出
//!   rstextfsm check <模板>...                                 - 只编译模板，报告全部问题
//!   rstextfsm blank <模板> [--write]                          - 规范化规则中的空白为 \s+
//!   rstextfsm index <模板文件> <平台> <命令> <缩写>             - 生成 index 文件条目
//!   rstextfsm scaffold <平台> <命令> [--index N]              - 创建空的 raw 样例与模板
//!   rstextfsm samples <平台> <命令>                           - 重新生成期望输出 yml
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rstextfsm::{
    index_entry, normalize_rule_whitespace, ConfigManager, GlobalConfig, RecordConverter,
    SampleLayout, TemplateLoader, TextParser,
};

#[derive(Debug, Parser)]
#[command(name = "rstextfsm", version, about = "TextFSM 模板解析工具")]
struct Cli {
    /// 模板目录
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,
    /// 样例根目录
    #[arg(long, global = true)]
    tests_dir: Option<PathBuf>,
    /// 保留列名原始大小写
    #[arg(long, global = true)]
    keep_case: bool,
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 用模板解析原始输出
    Parse {
        template: PathBuf,
        input: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// 编译模板并报告问题
    Check {
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },
    /// 规范化规则行中的空白
    Blank {
        template: PathBuf,
        /// 直接写回文件
        #[arg(short, long)]
        write: bool,
    },
    /// 生成 index 条目
    Index {
        template_file: String,
        platform: String,
        command: String,
        short: String,
    },
    /// 创建空的 raw 样例与模板文件
    Scaffold {
        platform: String,
        command: String,
        #[arg(long, default_value_t = 1)]
        index: usize,
    },
    /// 重新生成期望输出
    Samples { platform: String, command: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Table,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    #[cfg(not(feature = "tracing"))]
    {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(default_level),
        )
        .try_init();
    }
}

fn build_config(cli: &Cli) -> GlobalConfig {
    let defaults = ConfigManager::get_default();
    ConfigManager::custom()
        .templates_dir(cli.templates_dir.clone().unwrap_or(defaults.templates_dir))
        .tests_dir(cli.tests_dir.clone().unwrap_or(defaults.tests_dir))
        .lowercase_keys(!cli.keep_case)
        .verbose(cli.verbose)
        .build()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(config.verbose);

    match run(&cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: GlobalConfig) -> Result<ExitCode> {
    match &cli.command {
        Commands::Parse {
            template,
            input,
            format,
        } => {
            let template = TemplateLoader::load_file(template)?;
            let raw = fs::read_to_string(input)
                .with_context(|| format!("读取输入 {} 失败", input.display()))?;
            let output = template.run(&raw);
            let rendered = match format {
                OutputFormat::Json => {
                    RecordConverter::to_json_pretty(&output.records, config.lowercase_keys)?
                }
                OutputFormat::Yaml => {
                    RecordConverter::to_parsed_sample_yaml(&output.records, config.lowercase_keys)?
                }
                OutputFormat::Table => render_table(&output.header, &output.records),
            };
            println!("{}", rendered);
            if let Some(error) = output.error {
                eprintln!("❌ {}", error);
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Check { templates } => {
            let mut failed = 0;
            for path in templates {
                match TemplateLoader::load_file(path) {
                    Ok(template) => println!(
                        "✅ {}：{}个Value，{}个状态",
                        path.display(),
                        template.values().len(),
                        template.states().len()
                    ),
                    Err(e) => {
                        failed += 1;
                        eprintln!("❌ {}", e);
                    }
                }
            }
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Blank { template, write } => {
            let text = fs::read_to_string(template)
                .with_context(|| format!("读取模板 {} 失败", template.display()))?;
            let normalized = normalize_rule_whitespace(&text);
            if *write {
                fs::write(template, normalized)?;
            } else {
                print!("{}", normalized);
            }
        }
        Commands::Index {
            template_file,
            platform,
            command,
            short,
        } => {
            println!("{}", index_entry(template_file, platform, command, short)?);
        }
        Commands::Scaffold {
            platform,
            command,
            index,
        } => {
            let (raw, template) = SampleLayout::new(&config).scaffold(platform, command, *index)?;
            println!("{}", raw.display());
            println!("{}", template.display());
        }
        Commands::Samples { platform, command } => {
            let written = TextParser::new(config).regenerate_samples(platform, command)?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// 简单的对齐表格输出
fn render_table(header: &[String], records: &[rstextfsm::Record]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| record.values().iter().map(|v| v.to_string()).collect())
        .collect();
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(header)];
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}
