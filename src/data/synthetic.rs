//! Synthetic symptom-description generator.
//!
//! Composes free-text symptom descriptions from per-label phrase pools with
//! duration, age, onset and injury noise mixed in. Generation is fully
//! deterministic for a fixed seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::Record;
use crate::classifier::TriageLabel;

const SYM_COMMON: &[&str] = &[
    "headache", "sore throat", "runny nose", "stuffy nose", "mild cough",
    "sneezing", "fatigue", "tiredness", "low fever", "chills", "muscle ache",
    "nausea", "mild stomach pain", "diarrhea", "itchy eyes", "watery eyes",
    "back ache", "joint pain", "dizziness", "lightheadedness",
];

const SYM_DOCTOR: &[&str] = &[
    "high fever", "persistent fever", "strong cough", "productive cough",
    "sinus pain", "ear pain", "severe sore throat", "worsening cough",
    "abdominal pain", "vomiting", "blood in stool", "significant weight loss",
    "new lump", "persistent bleeding", "vision changes",
];

const SYM_URGENT: &[&str] = &[
    "moderate chest pain", "difficulty breathing", "worsening shortness of breath",
    "sudden dizziness", "severe vomiting", "high fever with rash",
    "dehydration", "confusion", "fainting", "severe abdominal pain",
];

const SYM_EMERGENCY: &[&str] = &[
    "severe chest pain", "difficulty breathing", "unconscious", "severe bleeding",
    "suspected stroke", "slurred speech", "one-sided weakness", "sudden confusion",
    "seizure", "very low blood pressure", "severe head trauma", "airway obstruction",
];

const DURATIONS: &[&str] = &[
    "for 1 day", "for 2 days", "for 3 days", "for a week", "since yesterday",
    "since this morning", "for several hours", "intermittently",
];

const AGE_PHRASES: &[&str] = &[
    "I am 25 years old", "A 40-year-old", "I'm 62", "Age 18", "A child aged 8",
    "A 70-year-old",
];

const ONSET: &[&str] = &[
    "started suddenly", "started gradually", "woke up with", "began after eating",
    "after exercise", "after the accident",
];

const INJURY_NOISE: &[&str] = &[
    "after a fall", "following a car accident", "after a sports injury",
    "sustained blunt trauma", "hit head on the floor", "cut while working",
];

/// Class balance of the generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Roughly equal rows per label
    Balanced,
    /// More mild cases than emergencies
    Realistic,
}

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or("")
}

fn maybe<'a>(rng: &mut StdRng, phrase: &'a str, prob: f64) -> &'a str {
    if rng.gen_bool(prob) {
        phrase
    } else {
        ""
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compose_self_monitor(rng: &mut StdRng) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if rng.gen_bool(0.6) {
        let age = pick(rng, AGE_PHRASES);
        parts.push(maybe(rng, age, 0.3));
    }
    parts.push(pick(rng, SYM_COMMON));
    if rng.gen_bool(0.5) {
        let duration = pick(rng, DURATIONS);
        parts.push(maybe(rng, duration, 0.9));
    }
    if rng.gen_bool(0.4) {
        parts.push("no shortness of breath or chest pain");
    }
    join_parts(&parts)
}

fn compose_doctor(rng: &mut StdRng) -> String {
    let mut parts: Vec<String> = Vec::new();
    let age = pick(rng, AGE_PHRASES);
    parts.push(maybe(rng, age, 0.3).to_string());
    parts.push(pick(rng, SYM_DOCTOR).to_string());
    if rng.gen_bool(0.7) {
        parts.push(format!("and {}", pick(rng, SYM_COMMON)));
    }
    parts.push(pick(rng, DURATIONS).to_string());
    if rng.gen_bool(0.3) {
        parts.push("symptoms are getting worse".to_string());
    }
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    join_parts(&parts)
}

fn compose_urgent(rng: &mut StdRng) -> String {
    let mut parts: Vec<String> = Vec::new();
    if rng.gen_bool(0.5) {
        let age = pick(rng, AGE_PHRASES);
        parts.push(maybe(rng, age, 0.4).to_string());
    }
    parts.push(pick(rng, SYM_URGENT).to_string());
    if rng.gen_bool(0.6) {
        parts.push(format!("started {}", pick(rng, DURATIONS).replace("for ", "")));
    }
    if rng.gen_bool(0.4) {
        parts.push("need urgent check".to_string());
    }
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    join_parts(&parts)
}

// Emergency sentences stay short and direct, with red flags.
fn compose_emergency(rng: &mut StdRng) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.push(pick(rng, SYM_EMERGENCY));
    if rng.gen_bool(0.5) {
        parts.push("started suddenly");
    }
    if rng.gen_bool(0.4) {
        parts.push(if rng.gen_bool(0.2) {
            "loss of consciousness"
        } else {
            "call emergency services"
        });
    }
    join_parts(&parts)
}

fn compose(rng: &mut StdRng, label: TriageLabel) -> String {
    let mut text = match label {
        TriageLabel::SelfMonitor => compose_self_monitor(rng),
        TriageLabel::Doctor => compose_doctor(rng),
        TriageLabel::UrgentCare => compose_urgent(rng),
        TriageLabel::Emergency => compose_emergency(rng),
    };
    if rng.gen_bool(0.12) {
        text = format!("{}: {}", pick(rng, ONSET), text);
    }
    if rng.gen_bool(0.05) {
        text = format!("{} {}", text, pick(rng, INJURY_NOISE));
    }
    let text = text.trim().to_string();
    if text.is_empty() {
        return pick(rng, SYM_COMMON).to_string();
    }
    text
}

/// Rows to generate per label for a total of `total` rows.
///
/// `Balanced` splits evenly with the remainder going to self-monitor;
/// `Realistic` skews heavily towards mild cases.
pub fn class_counts(total: usize, distribution: Distribution) -> Vec<(TriageLabel, usize)> {
    match distribution {
        Distribution::Balanced => {
            let per = total / 4;
            let remainder = total - per * 4;
            vec![
                (TriageLabel::SelfMonitor, per + remainder),
                (TriageLabel::Doctor, per),
                (TriageLabel::UrgentCare, per),
                (TriageLabel::Emergency, per),
            ]
        }
        Distribution::Realistic => vec![
            (TriageLabel::SelfMonitor, total * 60 / 100),
            (TriageLabel::Doctor, total * 20 / 100),
            (TriageLabel::UrgentCare, total * 15 / 100),
            (TriageLabel::Emergency, total * 5 / 100),
        ],
    }
}

/// Generates a shuffled synthetic dataset of roughly `total` rows.
pub fn generate(total: usize, distribution: Distribution, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(total);
    let mut id = 1u64;

    for (label, count) in class_counts(total, distribution) {
        for _ in 0..count {
            let mut text = compose(&mut rng, label);
            // Small variation in punctuation and capitalization.
            if rng.gen_bool(0.25) && !text.ends_with('.') {
                text.push('.');
            }
            if rng.gen_bool(0.4) {
                let mut chars = text.chars();
                if let Some(first) = chars.next() {
                    text = first.to_uppercase().chain(chars).collect();
                }
            }
            records.push(Record { id, text, label });
            id += 1;
        }
    }

    records.shuffle(&mut rng);
    records
}
