use {
    anyhow::{Context, Result},
    std::{io::Read, path::Path},
    tonality_config::TonalityConfig,
    tonality_sentiment::{Extraction, Lexicon, SentimentResolver, Source},
};

/// Run the full pipeline and print `{label, score, source}` as JSON.
pub async fn analyze(config: &TonalityConfig, text: &str) -> Result<bool> {
    let resolver = SentimentResolver::from_config(config);
    let outcome = resolver.analyze_detailed(text).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(true)
}

pub fn classify(config: &TonalityConfig, text: &str) -> Result<bool> {
    let lexicon = Lexicon::from_config(&config.lexicon);
    let counts = lexicon.counts(text);
    let result = counts.verdict();
    let output = serde_json::json!({
        "label": result.label,
        "score": result.score,
        "source": Source::Fallback,
        "hits": { "positive": counts.positive, "negative": counts.negative },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(true)
}

/// Run the extractor on a payload; `false` when nothing was found.
pub fn extract(file: Option<&Path>) -> Result<bool> {
    let payload = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        },
    };

    match tonality_sentiment::extract(&payload) {
        Extraction::Found {
            result,
            format,
            malformed,
        } => {
            let output = serde_json::json!({
                "label": result.label,
                "score": result.score,
                "format": format.as_str(),
                "malformed": malformed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(true)
        },
        Extraction::NotFound => {
            eprintln!("not found");
            Ok(false)
        },
    }
}
