//! # Placard CLI
//!
//! Usage:
//!   placard card.json -o layout.json
//!   echo '{ ... }' | placard
//!   placard --example > card.json
//!
//! Lays a document out with the built-in Helvetica metrics and prints the
//! resulting geometry as JSON. Set `RUST_LOG=placard=debug` to watch the
//! negotiation.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_card_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))
    };
    let input = match input {
        Ok(input) => input,
        Err(msg) => fail(&msg),
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone());

    let info = match placard::layout_info_json(&input) {
        Ok(info) => info,
        Err(e) => fail(&e.to_string()),
    };
    let json = match serde_json::to_string_pretty(&info) {
        Ok(json) => json,
        Err(e) => fail(&format!("Failed to serialize layout: {}", e)),
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                fail(&format!("Failed to write {}: {}", path, e));
            }
            eprintln!(
                "✓ Laid out {} elements, written to {}",
                info.elements.len(),
                path
            );
        }
        None => println!("{}", json),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("✗ {}", msg);
    process::exit(1);
}

fn example_card_json() -> &'static str {
    r##"{
  "canvas": {
    "width": 1200,
    "height": 630,
    "insetX": 64,
    "insetY": 48,
    "centerY": true,
    "backgroundColor": "#f4f1ea"
  },
  "content": {
    "type": "zstack",
    "alignment": "topLeading",
    "children": [
      {
        "type": "linearGradient",
        "colors": ["#f4f1ea", "#e2dccf"],
        "startPoint": { "x": 0, "y": 0 },
        "endPoint": { "x": 1, "y": 1 }
      },
      {
        "type": "vstack",
        "alignment": "leading",
        "children": [
          {
            "type": "hstack",
            "alignment": "center",
            "children": [
              {
                "type": "shape",
                "paths": ["M 0 12 L 12 0 L 24 12 L 12 24 Z"],
                "fillColor": "#c0392b",
                "offsetXFraction": 0,
                "scale": 0.04
              },
              { "type": "spacer", "dimension": 16 },
              {
                "type": "text",
                "text": "Field Notes",
                "font": { "face": "Helvetica", "size": 28, "weight": 700 },
                "color": "#c0392b"
              },
              { "type": "spacer" },
              {
                "type": "text",
                "text": "Issue 12",
                "font": { "size": 22 },
                "color": "#6b6b6b"
              }
            ]
          },
          { "type": "spacer", "dimension": 40 },
          {
            "type": "hstack",
            "alignment": "top",
            "children": [
              {
                "type": "vstack",
                "maxWidth": 620,
                "children": [
                  {
                    "type": "text",
                    "text": "Building a layout engine that negotiates instead of dictating",
                    "font": { "size": 56, "weight": 700 },
                    "color": "#1d1d1f"
                  },
                  { "type": "spacer", "dimension": 24 },
                  {
                    "type": "text",
                    "text": "Every node answers one question: how big would you be with this much room?",
                    "font": { "size": 26 },
                    "color": "#4a4a4a"
                  }
                ]
              },
              { "type": "spacer", "dimension": 32 },
              {
                "type": "image",
                "image": { "width": 800, "height": 600 },
                "grow": true,
                "maxWidth": 400,
                "rounded": true
              }
            ]
          },
          { "type": "spacer" },
          {
            "type": "rectangle",
            "width": 1072,
            "height": 4,
            "fillColor": "#1d1d1f"
          }
        ]
      }
    ]
  }
}
"##
}
