use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;

use ghiras::advisor::{Advisor, AdvisorError, DiagnosisResult, Language};
use ghiras::config::Config;

use crate::cli::common::{expand_path, read_image};

#[derive(Args)]
pub struct DiagnoseArgs {
    /// Photo of the plant (JPG, PNG, WEBP, ...)
    pub image: String,

    /// Mime type (inferred from the file extension by default)
    #[arg(long)]
    pub mime: Option<String>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Language for labels and messages (overrides config)
    #[arg(short, long, value_enum)]
    pub lang: Option<Language>,
}

pub async fn run(args: DiagnoseArgs, config: &Config) -> Result<()> {
    let language = args.lang.unwrap_or(config.chat.language);
    let advisor = Advisor::from_config(config)?;

    let path = expand_path(&args.image);
    let (bytes, mime_type) =
        read_image(&path, config.diagnosis.max_image_bytes, args.mime.as_deref()).await?;

    eprintln!("{}", language.pick("جاري التحليل...", "Analyzing..."));

    let result = match advisor.diagnosis().analyze(&bytes, &mime_type).await {
        Ok(result) => result,
        Err(e) => return Err(report_failure(e, language, &mut std::io::stderr())),
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print!("{}", render(&result, language)),
    }

    Ok(())
}

/// Every advisor error gets the localized notice; the detail stays in the error.
fn report_failure(
    err: AdvisorError,
    language: Language,
    out: &mut impl std::io::Write,
) -> anyhow::Error {
    let _ = writeln!(out, "{}", language.analysis_failed());
    err.into()
}

struct Labels {
    plant: &'static str,
    status: &'static str,
    healthy: &'static str,
    infected: &'static str,
    confidence: &'static str,
    treatments: &'static str,
    tips: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Ar => Labels {
            plant: "النبات",
            status: "الحالة",
            healthy: "سليم",
            infected: "مصاب",
            confidence: "نسبة الثقة",
            treatments: "العلاج المقترح",
            tips: "نصائح",
        },
        Language::En => Labels {
            plant: "Plant",
            status: "Status",
            healthy: "Healthy",
            infected: "Infected",
            confidence: "Confidence",
            treatments: "Treatments",
            tips: "Tips",
        },
    }
}

fn render(result: &DiagnosisResult, language: Language) -> String {
    let l = labels(language);
    let mut out = String::new();

    let _ = writeln!(out, "{}: {}", l.plant, result.plant_name);
    let status = match (&result.disease_name, result.is_healthy) {
        (_, true) => l.healthy.to_string(),
        (Some(disease), false) => format!("{} ({})", l.infected, disease),
        (None, false) => l.infected.to_string(),
    };
    let _ = writeln!(out, "{}: {}", l.status, status);
    let _ = writeln!(out, "{}: {}%", l.confidence, result.confidence);

    if !result.treatments.is_empty() {
        let _ = writeln!(out, "\n{}:", l.treatments);
        for (i, treatment) in result.treatments.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, treatment);
        }
    }

    if !result.tips.is_empty() {
        let _ = writeln!(out, "\n{}:", l.tips);
        for tip in &result.tips {
            let _ = writeln!(out, "  - {}", tip);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghiras::advisor::mock_diagnosis;

    #[tokio::test]
    async fn invalid_image_gets_the_localized_notice() {
        let mut config = Config::default();
        config.gemini.api_key = Some("test-key".to_string());
        let advisor = Advisor::from_config(&config).unwrap();

        // Rejected before any network call.
        let err = advisor.diagnosis().analyze(b"", "image/png").await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidImage(_)));

        let mut out = Vec::new();
        let err = report_failure(err, Language::Ar, &mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}\n", Language::Ar.analysis_failed())
        );
        assert!(err.downcast_ref::<AdvisorError>().is_some());
    }

    #[test]
    fn renders_infected_plant_in_english() {
        let text = render(&mock_diagnosis(), Language::En);
        assert!(text.starts_with("Plant: Tomato (Mock)\n"));
        assert!(text.contains("Status: Infected (Early Blight)"));
        assert!(text.contains("Confidence: 88%"));
        assert!(text.contains("  3. Improve air circulation around the plant."));
        assert!(text.contains("  - Rotate crops next season."));
    }

    #[test]
    fn renders_healthy_plant_in_arabic_without_treatments() {
        let mut result = mock_diagnosis();
        result.is_healthy = true;
        result.disease_name = None;
        result.treatments.clear();

        let text = render(&result, Language::Ar);
        assert!(text.contains("الحالة: سليم"));
        assert!(!text.contains("العلاج المقترح"));
        assert!(text.contains("نصائح:"));
    }
}
