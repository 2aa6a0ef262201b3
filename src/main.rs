use anyhow::Context;
use clap::Parser;
use gcms_pipeline::{cli, config, pipeline, session, summary};
use cli::{Cli, Commands};
use config::Config;
use pipeline::AnalyzeRequest;
use std::process::ExitCode;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            println!("🧪 gcms - GC-MS解析集計\n");
            let end = session::run_session(&config)?;
            return Ok(ExitCode::from(end.exit_code()));
        }

        Commands::Analyze { folder, format, threshold, no_plots } => {
            println!("🧪 gcms - 解析\n");

            let request = AnalyzeRequest {
                folder,
                format,
                threshold,
                plots: !no_plots,
            };
            println!("[1/2] ファイルを解析中... (閾値 {})", threshold);
            let outcome = pipeline::analyze(&request, &config)?;
            println!("✔ 解析成功 {}件 / スキップ {}件\n", outcome.parsed_count(), outcome.skipped.len());

            println!("[2/2] 結果");
            match &outcome.summary_path {
                Some(path) => {
                    println!("✔ シート: {}", outcome.sheet_names.join(", "));
                    println!("  次のステップ: gcms group {}", path.display());
                }
                None => println!("⚠ 集計ワークブックは作成されませんでした"),
            }

            println!("\n✅ 解析完了");
        }

        Commands::Group { workbook, groups } => {
            println!("🧪 gcms - レプリケートグループ\n");

            let sheets = summary::read_sheet_index(&workbook, &config.compound_column)?;
            let base_dir = workbook
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            let paths = pipeline::OutputPaths::new(&base_dir, &config);

            let mut recorder = summary::GroupRecorder::create(&paths.replicate_report)?;
            for spec in &groups {
                let result = summary::parse_group_spec(spec)
                    .and_then(|(label, members)| recorder.define(&label, &members, &sheets).map(|g| g.compounds.len()));
                match result {
                    Ok(count) => println!("✔ {} ({}化合物)", spec, count),
                    Err(e) => println!("⚠ {}。このグループは記録しません", e),
                }
            }

            let set = recorder.finish(&sheets)?;
            summary::save_replicate_set(&paths.replicate_record, &set)?;
            println!("✔ {}グループを保存: {}", set.groups.len(), paths.replicate_record.display());
        }

        Commands::Resolve { input, output } => {
            println!("🧪 gcms - PubChem検索\n");

            let set = summary::load_replicate_set(&input)?;
            let output_dir = output.unwrap_or_else(|| {
                input
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| std::path::PathBuf::from("."))
            });
            pipeline::resolve(&set, &output_dir, &config)?;

            println!("\n✅ 検索完了");
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定を書き出しました: {}", Config::config_path()?.display());
            }

            if show || !init {
                println!("設定:");
                println!("{}", serde_json::to_string_pretty(&config)?);
                println!("  PubChem URL: {}", config.pubchem_url());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
