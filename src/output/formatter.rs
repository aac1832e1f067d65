//! Output formatters for optimization reports

use crate::config::OutputFormat;
use crate::error::{Result, TeamOptimizerError};
use crate::output::report::*;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &OptimizationReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Dispatches a report to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Team Optimization Report: {{ project_name }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #007acc; padding-bottom: 20px; }
        .score-badge { display: inline-block; padding: 8px 16px; border-radius: 20px; font-weight: bold; color: white; margin-left: 10px; }
        .score-excellent { background: #28a745; }
        .score-good { background: #17a2b8; }
        .score-fair { background: #ffc107; color: #000; }
        .score-poor { background: #dc3545; }
        .warning { background: #fff3cd; border-left: 4px solid #ffc107; padding: 12px; border-radius: 6px; }
        .section h2 { color: #007acc; border-bottom: 2px solid #e9ecef; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin: 10px 0 20px; }
        th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #e9ecef; }
        .reused { color: #6c757d; font-style: italic; }
        .metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; }
        .metric { background: #f8f9fa; padding: 15px; border-radius: 6px; border-left: 4px solid #007acc; }
        .metadata { background: #e9ecef; padding: 15px; border-radius: 6px; margin-top: 30px; font-size: 0.9em; color: #6c757d; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Team Optimization Report</h1>
            <p>{{ project_name }} ({{ project_id }}) | {{ mode }} mode</p>
            <p>Generated: {{ generated_at }} | Processing time: {{ processing_time }}ms</p>
        </div>

        <div class="section">
            <h2>Summary</h2>
            <h3>Overall Score: {{ overall_score }}% <span class="score-badge {{ score_class }}">{{ score_label }}</span></h3>
            <p><strong>Verdict:</strong> {{ verdict }}</p>
            {% if is_fallback %}
            <p class="warning">No candidate satisfied the hard constraints. The team below is a placeholder assignment.</p>
            {% endif %}
        </div>

        {% for team in teams %}
        <div class="section">
            <h2>Team #{{ team.rank }}</h2>
            <p>Total fit: {{ team.total }} | Diversity: {{ team.diversity }}</p>
            <table>
                <tr><th>Role</th><th>Member</th><th>Fit</th><th>Skills</th></tr>
                {% for member in team.members %}
                <tr{% if member.reused %} class="reused"{% endif %}>
                    <td>{{ member.role }}</td>
                    <td>{{ member.name }}</td>
                    <td>{{ member.fit }}</td>
                    <td>{{ member.skills }}</td>
                </tr>
                {% endfor %}
            </table>
        </div>
        {% endfor %}

        <div class="section">
            <h2>Team Metrics</h2>
            <div class="metrics">
                <div class="metric"><h4>Workload Balance</h4><p><strong>{{ balance }}</strong></p></div>
                <div class="metric"><h4>Chemistry</h4><p><strong>{{ chemistry }}</strong></p></div>
                <div class="metric"><h4>Conflict Risk</h4><p><strong>{{ conflict_risk }}</strong></p></div>
                <div class="metric"><h4>Cohesion</h4><p><strong>{{ cohesion }}</strong></p></div>
            </div>
        </div>

        <div class="section">
            <h2>Recommendations</h2>
            <ul>
                {% for rec in recommendations %}
                <li>{{ rec }}</li>
                {% endfor %}
            </ul>
        </div>

        <div class="metadata">
            <p><strong>Generated by Team Optimizer v{{ version }}</strong></p>
            <p><strong>Embedding model:</strong> {{ embedding_model }} | <strong>Candidates:</strong> {{ candidates_surviving }} of {{ candidates_enumerated }} passed constraints</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    project_name: String,
    project_id: String,
    mode: String,
    generated_at: String,
    processing_time: u64,
    overall_score: u8,
    score_class: String,
    score_label: String,
    verdict: String,
    is_fallback: bool,
    teams: Vec<HtmlTeam>,
    balance: String,
    chemistry: String,
    conflict_risk: String,
    cohesion: String,
    recommendations: Vec<String>,
    version: String,
    embedding_model: String,
    candidates_enumerated: usize,
    candidates_surviving: usize,
}

struct HtmlTeam {
    rank: usize,
    total: String,
    diversity: String,
    members: Vec<HtmlMember>,
}

struct HtmlMember {
    role: String,
    name: String,
    fit: String,
    skills: String,
    reused: bool,
}

fn score_label(score: u8) -> &'static str {
    match score {
        90..=100 => "EXCELLENT",
        75..=89 => "GOOD",
        60..=74 => "FAIR",
        _ => "POOR",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let label = score_label(score);
        if !self.use_colors {
            return format!("[{}]", label);
        }
        let color = match score {
            90..=100 => Color::Green,
            75..=89 => Color::BrightGreen,
            60..=74 => Color::Yellow,
            _ => Color::Red,
        };
        format!("[{}]", label.color(color).bold())
    }

    fn format_team(&self, team: &TeamReport, output: &mut String) {
        output.push_str(&format!(
            "Total fit: {:.3} | Diversity: {:.2}\n",
            team.total_score, team.diversity_score
        ));
        for (member, fit) in team.members.iter().zip(team.explanations.iter()) {
            let name = if member.reused {
                self.colorize(&format!("{} (again)", member.name), Color::BrightBlack)
            } else {
                self.colorize(&member.name, Color::White)
            };
            output.push_str(&format!(
                "  • {:<24} {} [{:.3}]\n",
                member.role,
                name,
                fit
            ));
            if self.detailed && !member.skills.is_empty() {
                output.push_str(&format!(
                    "      {}\n",
                    self.colorize(&format_skills(&member.skills), Color::BrightBlack)
                ));
            }
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &OptimizationReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("TEAM OPTIMIZATION: {}", report.project_name), 1));
        output.push_str(&format!(
            "Generated: {} | Mode: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.mode,
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Summary", 2));
        let score = report.overall_score_percentage();
        output.push_str(&format!("Overall Score: {}% {}\n", score, self.format_score_badge(score)));
        output.push_str(&format!("Verdict: {}\n", self.colorize(report.verdict(), Color::Cyan)));
        if report.is_fallback() {
            output.push_str(&self.colorize(
                "Warning: no candidate satisfied the hard constraints, showing a placeholder team\n",
                Color::Yellow,
            ));
        }

        let shown = if self.detailed { report.teams.len() } else { 1 };
        for team in report.teams.iter().take(shown) {
            output.push_str(&self.format_header(&format!("Team #{}", team.rank), 2));
            self.format_team(team, &mut output);
        }

        output.push_str(&self.format_header("Team Metrics", 3));
        let workload = &report.workload_metrics;
        let chemistry = &report.chemistry_metrics;
        output.push_str(&format!("Workload balance: {:.2}\n", workload.balance_score));
        output.push_str(&format!("Chemistry:        {:.2}\n", chemistry.overall_chemistry));
        output.push_str(&format!("Conflict risk:    {:.2}\n", chemistry.conflict_risk));
        if self.detailed {
            output.push_str(&format!("Communication:    {:.2}\n", chemistry.communication_score));
            output.push_str(&format!("Collaboration:    {:.2}\n", chemistry.collaboration_score));
            output.push_str(&format!("Cohesion:         {:.2}\n", chemistry.team_cohesion));
            for member in &workload.distribution {
                output.push_str(&format!("  {:<24} workload {:.2}\n", member.name, member.workload));
            }
        }

        output.push_str(&self.format_header("Recommendations", 3));
        for rec in &report.recommendations {
            output.push_str(&format!("  • {}\n", rec));
        }

        if self.detailed {
            output.push_str(&self.format_header("Search", 3));
            output.push_str(&format!(
                "Candidates: {} enumerated, {} passed hard constraints\n",
                report.metadata.candidates_enumerated, report.metadata.candidates_surviving
            ));
            if let Some(model) = &report.metadata.embedding_model {
                output.push_str(&format!("Embedding model: {}\n", model));
            }
            if !report.constraints.ignored.is_empty() {
                output.push_str(&format!(
                    "Ignored constraint clauses: {}\n",
                    report.constraints.ignored.join("; ")
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &OptimizationReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &OptimizationReport) -> Result<String> {
        let mut content = String::new();

        content.push_str(&format!("# Team Optimization: {}\n\n", report.project_name));
        content.push_str(&format!(
            "**Overall Score:** {}% ({})\n\n",
            report.overall_score_percentage(),
            score_label(report.overall_score_percentage())
        ));
        content.push_str(&format!("**Verdict:** {}\n\n", report.verdict()));
        if report.is_fallback() {
            content.push_str("> **Warning:** no candidate satisfied the hard constraints; this is a placeholder team.\n\n");
        }

        for team in &report.teams {
            content.push_str(&format!(
                "## Team #{}\n\nTotal fit: {:.3} | Diversity: {:.2}\n\n",
                team.rank, team.total_score, team.diversity_score
            ));
            content.push_str("| Role | Member | Fit | Skills |\n|------|--------|-----|--------|\n");
            for (member, fit) in team.members.iter().zip(team.explanations.iter()) {
                let name = if member.reused {
                    format!("{} *(again)*", member.name)
                } else {
                    member.name.clone()
                };
                content.push_str(&format!(
                    "| {} | {} | {:.3} | {} |\n",
                    Self::escape_cell(&member.role),
                    Self::escape_cell(&name),
                    fit,
                    Self::escape_cell(&format_skills(&member.skills))
                ));
            }
            content.push('\n');
        }

        let chemistry = &report.chemistry_metrics;
        content.push_str("## Team Metrics\n\n");
        content.push_str(&format!("- Workload balance: {:.2}\n", report.workload_metrics.balance_score));
        content.push_str(&format!("- Chemistry: {:.2}\n", chemistry.overall_chemistry));
        content.push_str(&format!("- Communication: {:.2}\n", chemistry.communication_score));
        content.push_str(&format!("- Collaboration: {:.2}\n", chemistry.collaboration_score));
        content.push_str(&format!("- Conflict risk: {:.2}\n", chemistry.conflict_risk));
        content.push_str(&format!("- Cohesion: {:.2}\n\n", chemistry.team_cohesion));

        content.push_str("## Recommendations\n\n");
        for rec in &report.recommendations {
            content.push_str(&format!("- {}\n", rec));
        }

        if self.include_metadata {
            content.push_str("\n---\n\n");
            content.push_str(&format!(
                "*Generated {} by Team Optimizer v{} ({} mode, {}ms). {} of {} candidates passed constraints.*\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.optimizer_version,
                report.mode,
                report.metadata.processing_time_ms,
                report.metadata.candidates_surviving,
                report.metadata.candidates_enumerated
            ));
        }

        Ok(content)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &OptimizationReport) -> HtmlTemplate {
        let score = report.overall_score_percentage();
        let score_class = match score {
            90..=100 => "score-excellent",
            75..=89 => "score-good",
            60..=74 => "score-fair",
            _ => "score-poor",
        };

        let teams = report
            .teams
            .iter()
            .map(|team| HtmlTeam {
                rank: team.rank,
                total: format!("{:.3}", team.total_score),
                diversity: format!("{:.2}", team.diversity_score),
                members: team
                    .members
                    .iter()
                    .zip(team.explanations.iter())
                    .map(|(member, fit)| HtmlMember {
                        role: member.role.clone(),
                        name: member.name.clone(),
                        fit: format!("{:.3}", fit),
                        skills: format_skills(&member.skills),
                        reused: member.reused,
                    })
                    .collect(),
            })
            .collect();

        let chemistry = &report.chemistry_metrics;
        HtmlTemplate {
            include_styles: self.include_styles,
            project_name: report.project_name.clone(),
            project_id: report.project_id.clone(),
            mode: report.mode.to_string(),
            generated_at: report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            processing_time: report.metadata.processing_time_ms,
            overall_score: score,
            score_class: score_class.to_string(),
            score_label: score_label(score).to_string(),
            verdict: report.verdict().to_string(),
            is_fallback: report.is_fallback(),
            teams,
            balance: format!("{:.2}", report.workload_metrics.balance_score),
            chemistry: format!("{:.2}", chemistry.overall_chemistry),
            conflict_risk: format!("{:.2}", chemistry.conflict_risk),
            cohesion: format!("{:.2}", chemistry.team_cohesion),
            recommendations: report.recommendations.clone(),
            version: report.metadata.optimizer_version.clone(),
            embedding_model: report
                .metadata
                .embedding_model
                .clone()
                .unwrap_or_else(|| "none".to_string()),
            candidates_enumerated: report.metadata.candidates_enumerated,
            candidates_surviving: report.metadata.candidates_surviving,
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &OptimizationReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| TeamOptimizerError::OutputFormatting(format!("HTML rendering failed: {}", e)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true, true)
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
        include_html_styles: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
        }
    }

    pub fn generate_report(&self, report: &OptimizationReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, project_id: &str, timestamp: bool) -> String {
    let base_name: String = project_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };

    format!("{}_team{}.{}", base_name, timestamp_suffix, extension)
}
