use std::path::Path;

use anyhow::Result;

use safeview::AnalysisRun;

pub fn cmd_summary(response: &Path, json: bool) -> Result<()> {
    let run = super::load_run(response)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.summary())?);
        return Ok(());
    }

    print_summary(&run);
    Ok(())
}

pub fn print_summary(run: &AnalysisRun) {
    println!("📊 Summary");
    println!(
        "   Overall Visibility: {}",
        run.overall_visibility().unwrap_or("N/A")
    );
    println!("   Events: {}", run.events().len());

    let Some(report) = run.summary() else {
        println!("   No report in response");
        return;
    };

    println!("   Duration: {:.1}s", report.duration_sec);
    let b = &report.vis_breakdown;
    println!(
        "   Visibility breakdown: good {:.1} | moderate {:.1} | poor {:.1}",
        b.good, b.moderate, b.poor
    );
    if !report.event_counts.is_empty() {
        let counts: Vec<String> = report
            .event_counts
            .iter()
            .map(|(category, count)| format!("{category}={count}"))
            .collect();
        println!("   Event counts: {}", counts.join(", "));
    }
    println!("   Total risk events: {}", report.total_risk_events);
    println!(
        "   Reduced-visibility risk: {:.2}",
        report.reduced_visibility_risk
    );
    println!(
        "   Overall risk: {}",
        report.overall_risk.as_deref().unwrap_or("N/A")
    );
}
