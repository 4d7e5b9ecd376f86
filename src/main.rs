use anyhow::{Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use serde_json::Value;
use tracing::Level;

use agentview::agent::client::AgentClient;
use agentview::agent::config::AgentEndpointConfig;
use agentview::conversation::Conversation;
use agentview::pipeline::extract_content;
use agentview::types::content::{ExtractedContent, GraphMetadata, NormalizedContent};
use agentview::types::message::{Message, Role};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Agent endpoint URL (can also be set via AGENT_ENDPOINT environment variable)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut config =
        AgentEndpointConfig::from_env().context("Failed to load agent endpoint settings")?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let client = AgentClient::new(config)?;
    let mut conversation = Conversation::new(client);

    println!(
        "Agent view {}",
        style("- type \"exit\" to end the session, \"/endpoint <url>\" to switch agents, \"/history\" to list messages").dim()
    );
    println!("Connected to {}\n", style(conversation.endpoint()).cyan());

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;
        let command = message_text.trim();

        if command.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(endpoint) = endpoint_command(command) {
            match endpoint {
                Some(endpoint) => {
                    conversation.set_endpoint(endpoint);
                    println!("Endpoint set to {}\n", style(endpoint).cyan());
                }
                None => println!("Current endpoint: {}\n", style(conversation.endpoint()).cyan()),
            }
            continue;
        }
        if command == "/history" {
            render_history(conversation.messages());
            continue;
        }

        let spin = spinner();
        spin.start("awaiting reply");
        let result = conversation.submit(command).map(|reply| reply.cloned());
        spin.stop("");

        match result {
            Ok(Some(reply)) => render_message(&reply),
            Ok(None) => {}
            Err(e) => {
                println!(
                    "{}",
                    style(
                        "Failed to connect to AI agent. Please check your endpoint configuration."
                    )
                    .red()
                );
                println!("{}", style(e).dim());
            }
        }
        println!("\n");
    }
    Ok(())
}

/// Parse `/endpoint` (show) or `/endpoint <url>` (switch).
fn endpoint_command(command: &str) -> Option<Option<&str>> {
    let rest = command.strip_prefix("/endpoint")?;
    if rest.is_empty() {
        return Some(None);
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let endpoint = rest.trim();
    Some((!endpoint.is_empty()).then_some(endpoint))
}

fn render_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}\n", style("No messages yet").dim());
        return;
    }
    for message in messages {
        let who = match message.role {
            Role::User => style("you").green(),
            Role::Agent => style("agent").magenta(),
        };
        let kind = message.kind.map(|k| format!(" [{}]", k)).unwrap_or_default();
        println!(
            "{} {}{}",
            style(message.timestamp.format("%H:%M:%S")).dim(),
            who,
            style(kind).dim()
        );
    }
    println!();
}

fn render_message(message: &Message) {
    let Some(kind) = message.kind else {
        print_as(message.text().unwrap_or_default(), "markdown");
        return;
    };
    let graph = message.content.as_normalized().map(|n| &n.graph);

    match extract_content(&message.content, kind) {
        ExtractedContent::Markdown(text) => print_as(&text, "markdown"),
        ExtractedContent::Html(text) => print_as(&text, "html"),
        ExtractedContent::Graph(dot) => render_graph(&dot, graph),
        ExtractedContent::Chart { data, layout } => render_chart(&data, &layout),
        ExtractedContent::Combined(content) => render_combined(&content),
    }
}

fn render_combined(content: &NormalizedContent) {
    if let Some(text) = content.text.as_deref().filter(|t| !t.is_empty()) {
        print_as(text, "markdown");
        println!();
    }
    if let Some(dot) = content.graph_dot.as_deref().filter(|_| content.has_graph()) {
        render_graph(dot, Some(&content.graph));
    }
    if let (true, Some(data), Some(layout)) =
        (content.has_chart(), &content.chart_data, &content.chart_layout)
    {
        render_chart(data, layout);
    }
}

fn render_graph(dot: &str, metadata: Option<&GraphMetadata>) {
    println!("{}", style("Causal graph").bold());
    print_as(dot, "dot");

    if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
        let edges = metadata
            .edges_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        let threshold = metadata
            .threshold_used
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{}",
            style(format!("Graph details: {} edges, threshold: {}", edges, threshold)).dim()
        );
        if let Some(features) = &metadata.selected_features {
            println!("{}", style(format!("Features: {}", features.join(", "))).dim());
        }
    }
}

fn render_chart(data: &Value, layout: &Value) {
    let title = layout_title(layout, "/title").unwrap_or("Chart");
    println!("{}", style(title).bold());
    println!(
        "{}",
        style(format!(
            "x: {}  y: {}",
            layout_title(layout, "/xaxis/title").unwrap_or("X Axis"),
            layout_title(layout, "/yaxis/title").unwrap_or("Y Axis"),
        ))
        .dim()
    );

    for series in data.as_array().into_iter().flatten() {
        let xs = series.get("x").and_then(Value::as_array);
        let ys = series.get("y").and_then(Value::as_array);
        if let (Some(xs), Some(ys)) = (xs, ys) {
            for (x, y) in xs.iter().zip(ys) {
                println!("  {} -> {}", x, y);
            }
        }
    }

    match serde_json::to_string_pretty(&serde_json::json!({ "data": data, "layout": layout })) {
        Ok(json) => print_as(&json, "json"),
        Err(_) => println!("{}", data),
    }
}

/// Layout titles are either plain strings or `{ "text": .. }` objects.
fn layout_title<'a>(layout: &'a Value, pointer: &str) -> Option<&'a str> {
    let title = layout.pointer(pointer)?;
    title
        .as_str()
        .or_else(|| title.get("text").and_then(Value::as_str))
}

fn print_as(content: &str, language: &str) {
    let printed = PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language(language)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}
