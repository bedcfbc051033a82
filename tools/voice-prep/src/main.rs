//! # Voice Prep
//!
//! 配音准备工具 - 从视觉小说脚本中提取角色台词，标注语气，整理参考音频，调用 GPT-SoVITS 合成语音。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p voice-prep -- parse test.txt
//! cargo run -p voice-prep -- parse test.txt --output figures_output
//! cargo run -p voice-prep -- check chapter1.txt chapter2.txt --all
//! cargo run -p voice-prep -- tone figures_output --config config/voice_prep.json
//! cargo run -p voice-prep -- refs reference_audio --output reference_audio_storage/list.json
//! cargo run -p voice-prep -- tts figures_output --ref-audio ref/calm.wav --prompt-lang zh
//!
//! # 或安装后直接使用
//! cargo install --path tools/voice-prep
//! voiceprep parse test.txt
//! ```

mod config;
mod coze;
mod figures;
mod lang;
mod reference_audio;
mod tts;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vn_dialogue::{
    DiagnosticLevel, DiagnosticResult, ToneClassifier, analyze_script, annotate_tones,
    export_file_name,
};

use config::{TtsConfig, VoicePrepConfig};
use coze::CozeClassifier;
use tts::{GptSovitsClient, SpeechSynthesizer};

#[derive(Parser)]
#[command(name = "voiceprep")]
#[command(about = "配音准备工具 - 提取角色台词、语气标注、参考音频清单、语音合成")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：config/voice_prep.json）
    #[arg(short, long, default_value = "config/voice_prep.json", global = true)]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析脚本并按角色导出台词
    Parse {
        /// 脚本文件
        script: PathBuf,

        /// 输出目录（默认取配置中的 output_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 检查脚本中被跳过的行
    Check {
        /// 脚本文件（可多个）
        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// 同时显示信息级诊断
        #[arg(long)]
        all: bool,
    },

    /// 为导出目录中的每个角色文件标注语气
    Tone {
        /// 角色台词目录（默认取配置中的 output_dir）
        dir: Option<PathBuf>,
    },

    /// 扫描参考音频目录并生成清单
    Refs {
        /// 参考音频根目录（默认取配置中的 reference_audio_dir）
        root: Option<PathBuf>,

        /// 清单输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 调用 GPT-SoVITS 为每句台词合成语音
    Tts {
        /// 角色台词目录（默认取配置中的 output_dir）
        dir: Option<PathBuf>,

        /// 音频输出目录（默认取配置中的 tts.output_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 参考音频路径
        #[arg(long)]
        ref_audio: Option<String>,

        /// 参考音频对应的文本
        #[arg(long)]
        prompt_text: Option<String>,

        /// 参考音频文本的语言
        #[arg(long)]
        prompt_lang: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = real_main(cli) {
        error!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let config = VoicePrepConfig::load(&cli.config);

    match cli.command {
        Commands::Parse { script, output } => {
            let output = output.unwrap_or(config.output_dir);
            parse_command(&script, &output)
        }
        Commands::Check { scripts, all } => check_command(&scripts, all),
        Commands::Tone { dir } => {
            let dir = dir.unwrap_or_else(|| config.output_dir.clone());
            let classifier = CozeClassifier::new(config.coze.clone())?;
            let summary = annotate_dir(&classifier, &dir, config.batch_size)?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "语气标注完成"
            );
            if summary.failed > 0 {
                anyhow::bail!("{} 个角色文件标注失败", summary.failed);
            }
            Ok(())
        }
        Commands::Refs { root, output } => {
            let root = root.unwrap_or(config.reference_audio_dir);
            let output = output.unwrap_or_else(reference_audio::default_output_path);
            let list = reference_audio::save_reference_audio_list(&root, &output)?;
            info!(
                models = list.models.len(),
                clips = reference_audio::count_clips(&list),
                output = %output.display(),
                "参考音频清单已保存"
            );
            Ok(())
        }
        Commands::Tts {
            dir,
            output,
            ref_audio,
            prompt_text,
            prompt_lang,
        } => {
            let dir = dir.unwrap_or_else(|| config.output_dir.clone());
            let mut settings = config.tts;
            if let Some(ref_audio) = ref_audio {
                settings.ref_audio_path = ref_audio;
            }
            if let Some(prompt_text) = prompt_text {
                settings.prompt_text = prompt_text;
            }
            if let Some(prompt_lang) = prompt_lang {
                settings.prompt_lang = prompt_lang;
            }
            let output = output.unwrap_or_else(|| settings.output_dir.clone());

            let client = GptSovitsClient::new(settings.clone())?;
            let summary = synthesize_dir(&client, &settings, &dir, &output)?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                output = %output.display(),
                "语音合成完成"
            );
            if summary.failed > 0 {
                anyhow::bail!("{} 句台词合成失败", summary.failed);
            }
            Ok(())
        }
    }
}

fn parse_command(script: &Path, output: &Path) -> anyhow::Result<()> {
    let parsed = figures::parse_script_file(script)?;
    if parsed.is_empty() {
        warn!(script = %script.display(), "脚本中没有可导出的台词");
    }

    let written = figures::export_figures(&parsed.records, output)?;
    info!(
        files = written.len(),
        output = %output.display(),
        "已按角色导出台词"
    );
    Ok(())
}

fn check_command(scripts: &[PathBuf], all: bool) -> anyhow::Result<()> {
    let (result, record_count, figure_count) = check_scripts(scripts)?;

    let min_level = if all {
        DiagnosticLevel::Info
    } else {
        DiagnosticLevel::Warn
    };
    for diag in result.filter_by_level(min_level) {
        println!("{diag}");
    }

    println!();
    println!(
        "脚本 {} 个，台词 {} 条，角色 {} 个，警告 {} 条",
        scripts.len(),
        record_count,
        figure_count,
        result.warn_count()
    );
    Ok(())
}

/// 依次分析多个脚本，合并诊断并累计台词数与角色数
fn check_scripts(scripts: &[PathBuf]) -> anyhow::Result<(DiagnosticResult, usize, usize)> {
    let mut result = DiagnosticResult::new();
    let (mut record_count, mut figure_count) = (0, 0);

    for script in scripts {
        let parsed = figures::parse_script_file(script)?;
        record_count += parsed.records.len();
        figure_count += parsed.figures.len();
        result.merge(analyze_script(&script.display().to_string(), &parsed));
    }
    Ok((result, record_count, figure_count))
}

/// 批量处理结果
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    succeeded: usize,
    failed: usize,
}

/// 逐个角色文件标注语气并写回
///
/// 单个文件失败只记录日志，继续处理下一个。
fn annotate_dir<C>(classifier: &C, dir: &Path, batch_size: usize) -> anyhow::Result<BatchSummary>
where
    C: ToneClassifier + ?Sized,
{
    let mut summary = BatchSummary::default();

    for name in figures::list_figure_files(dir)? {
        let path = dir.join(export_file_name(&name));
        match annotate_file(classifier, &path, batch_size) {
            Ok(updated) => {
                info!(figure = %name, updated, "语气标注已写回");
                summary.succeeded += 1;
            }
            Err(e) => {
                error!(figure = %name, "语气标注失败: {e:#}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn annotate_file<C>(classifier: &C, path: &Path, batch_size: usize) -> anyhow::Result<usize>
where
    C: ToneClassifier + ?Sized,
{
    let mut records = figures::read_figure_file(path)?;
    let updated = annotate_tones(classifier, &mut records, batch_size)?;
    figures::write_figure_file(path, &records)?;
    Ok(updated)
}

/// 逐句合成语音，写入 `<output>/<id>_<step>.<media_type>`
///
/// 空台词跳过；单句或单个文件失败只记录日志，继续处理。结果按台词计数。
fn synthesize_dir<S>(
    synthesizer: &S,
    settings: &TtsConfig,
    dir: &Path,
    output: &Path,
) -> anyhow::Result<BatchSummary>
where
    S: SpeechSynthesizer + ?Sized,
{
    fs::create_dir_all(output)
        .with_context(|| format!("创建输出目录失败: {}", output.display()))?;
    let mut summary = BatchSummary::default();

    for name in figures::list_figure_files(dir)? {
        let records = match figures::read_figure_file(&dir.join(export_file_name(&name))) {
            Ok(records) => records,
            Err(e) => {
                error!(figure = %name, "读取角色文件失败: {e:#}");
                summary.failed += 1;
                continue;
            }
        };

        for record in records.iter().filter(|r| !r.text.trim().is_empty()) {
            let request = tts::request_for_record(settings, record);
            let path = output.join(tts::audio_file_name(record, &request.media_type));
            let result = synthesizer
                .synthesize(&request)
                .map_err(anyhow::Error::from)
                .and_then(|audio| {
                    fs::write(&path, audio)
                        .with_context(|| format!("写入文件失败: {}", path.display()))
                });
            match result {
                Ok(()) => {
                    info!(figure = %name, step = record.step, lang = %request.text_lang, "已合成");
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!(figure = %name, step = record.step, "合成失败: {e:#}");
                    summary.failed += 1;
                }
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use crate::tts::{TtsError, TtsRequest};
    use vn_dialogue::{DialogueRecord, ToneError};

    /// 给每条记录打上 "calm" 的假分类器，遇到 id 为 "broken" 的记录时失败
    struct FakeClassifier;

    impl ToneClassifier for FakeClassifier {
        fn classify(&self, batch: &[DialogueRecord]) -> Result<Vec<DialogueRecord>, ToneError> {
            if batch.iter().any(|r| r.id == "broken") {
                return Err(ToneError::MissingAnswer);
            }
            Ok(batch
                .iter()
                .map(|r| {
                    let mut labeled = DialogueRecord::default().with_step(r.step);
                    labeled.emotion = "calm".to_string();
                    labeled
                })
                .collect())
        }
    }

    /// 返回台词字节的假合成器，台词为 "fail" 时失败；记录每次请求
    struct FakeSynthesizer {
        requests: RefCell<Vec<TtsRequest>>,
    }

    impl SpeechSynthesizer for FakeSynthesizer {
        fn synthesize(&self, request: &TtsRequest) -> Result<Vec<u8>, TtsError> {
            self.requests.borrow_mut().push(request.clone());
            if request.text == "fail" {
                return Err(TtsError::Status {
                    status: 400,
                    message: "tts failed".to_string(),
                });
            }
            Ok(request.text.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["voiceprep", "parse", "test.txt", "-o", "out"]).unwrap();
        assert!(matches!(cli.command, Commands::Parse { ref output, .. } if output.as_deref() == Some(Path::new("out"))));

        let cli = Cli::try_parse_from(["voiceprep", "tone", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Tone { dir: None }));

        let cli = Cli::try_parse_from(["voiceprep", "check", "a.txt", "b.txt", "--all"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { ref scripts, all: true } if scripts.len() == 2));
        assert!(Cli::try_parse_from(["voiceprep", "check"]).is_err());

        let cli = Cli::try_parse_from([
            "voiceprep",
            "tts",
            "figures_output",
            "--ref-audio",
            "ref/calm.wav",
            "--prompt-lang",
            "ja",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tts { ref ref_audio, ref prompt_lang, output: None, .. }
                if ref_audio.as_deref() == Some("ref/calm.wav") && prompt_lang.as_deref() == Some("ja")
        ));
    }

    #[test]
    fn test_parse_then_annotate_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("test.txt");
        fs::write(
            &script,
            "changeFigure:a.json -id=anon -motion=idle;\n\
             千早爱音:你好 -figureId=anon;\n\
             changeFigure:b.json -id=broken -motion=idle;\n\
             ???:…… -figureId=broken;\n",
        )
        .unwrap();

        let out = dir.path().join("figures_output");
        parse_command(&script, &out).unwrap();
        fs::write(out.join("garbage.json"), "not json").unwrap();

        let summary = annotate_dir(&FakeClassifier, &out, 10).unwrap();
        assert_eq!(summary, BatchSummary { succeeded: 1, failed: 2 });

        let anon = figures::read_figure_file(&out.join("anon.json")).unwrap();
        assert_eq!(anon[0].emotion, "calm");
        assert_eq!(anon[0].text, "你好");

        // 失败的文件保持原样
        let broken = figures::read_figure_file(&out.join("broken.json")).unwrap();
        assert!(broken[0].emotion.is_empty());
    }

    #[test]
    fn test_annotate_empty_figure_file_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        figures::write_figure_file(&dir.path().join("empty.json"), &[]).unwrap();

        let summary = annotate_dir(&FakeClassifier, dir.path(), 10).unwrap();
        assert_eq!(summary, BatchSummary { succeeded: 1, failed: 0 });
        assert!(figures::read_figure_file(&dir.path().join("empty.json")).unwrap().is_empty());
    }

    #[test]
    fn test_check_merges_diagnostics_across_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("chapter1.txt");
        let second = dir.path().join("chapter2.txt");
        fs::write(&first, "changeFigure:m.json -id=A -motion=idle;
Alice:Hi -figureId=A;
").unwrap();
        fs::write(&second, "changeBg:bg.png;
Bob:Hi -figureId=Z;
").unwrap();

        let (result, record_count, figure_count) =
            check_scripts(&[first, second.clone()]).unwrap();

        assert_eq!((record_count, figure_count), (1, 1));
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.warn_count(), 1);
        assert!(
            result
                .diagnostics
                .iter()
                .all(|d| d.script_id == second.display().to_string())
        );
    }

    #[test]
    fn test_synthesize_dir_writes_audio_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("test.txt");
        fs::write(
            &script,
            "changeFigure:a.json -id=anon -motion=idle;
             千早爱音:你好 -figureId=anon;
             千早爱音:fail -figureId=anon;
             千早爱音: -figureId=anon;
             千早爱音:Good morning -figureId=anon;
",
        )
        .unwrap();
        let figures_dir = dir.path().join("figures_output");
        parse_command(&script, &figures_dir).unwrap();
        fs::write(figures_dir.join("garbage.json"), "not json").unwrap();

        let settings = TtsConfig {
            ref_audio_path: "ref/calm.wav".to_string(),
            ..TtsConfig::default()
        };
        let synthesizer = FakeSynthesizer {
            requests: RefCell::new(Vec::new()),
        };
        let out = dir.path().join("tts_output");

        let summary = synthesize_dir(&synthesizer, &settings, &figures_dir, &out).unwrap();

        // 空台词不发请求；garbage.json 与 "fail" 各算一次失败
        assert_eq!(summary, BatchSummary { succeeded: 2, failed: 2 });
        let langs: Vec<_> = synthesizer
            .requests
            .borrow()
            .iter()
            .map(|r| r.text_lang.clone())
            .collect();
        assert_eq!(langs, vec!["zh", "en", "en"]);

        assert_eq!(fs::read(out.join("anon_1.wav")).unwrap(), "你好".as_bytes());
        assert_eq!(fs::read(out.join("anon_4.wav")).unwrap(), b"Good morning");
        assert!(!out.join("anon_2.wav").exists());
        assert!(!out.join("anon_3.wav").exists());
    }
}
