//! Question sources
//!
//! A run draws its active question from a [`QuestionBank`]: either generated
//! arithmetic or an external deck of prompt/answer pairs. Decks are validated
//! once on construction so the simulation never sees an empty bank.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::consts::MAX_OPERAND;
use crate::error::BankError;

/// Which question source a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Generated `a op b` problems
    Arithmetic,
    /// Externally supplied prompt/answer pairs
    Deck,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Arithmetic => "arithmetic",
            GameMode::Deck => "deck",
        }
    }
}

/// The active prompt and its answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answer: String,
    /// Wrong answers to show on carriers (empty for generated arithmetic)
    pub distractors: Vec<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            distractors: Vec::new(),
        }
    }

    pub fn with_distractors<S: Into<String>>(mut self, distractors: impl IntoIterator<Item = S>) -> Self {
        self.distractors = distractors.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `value` is this question's correct answer
    pub fn is_answer(&self, value: &str) -> bool {
        answers_match(&self.answer, value)
    }
}

/// Answers compare trimmed and case-insensitively
pub fn answers_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Arithmetic operators used by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    const ALL: [Op; 3] = [Op::Add, Op::Sub, Op::Mul];

    fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "×",
        }
    }
}

/// Procedural arithmetic questions
#[derive(Debug, Clone)]
pub struct ArithmeticGenerator {
    pub max_operand: u32,
}

impl ArithmeticGenerator {
    pub fn new(max_operand: u32) -> Self {
        Self {
            max_operand: max_operand.clamp(1, MAX_OPERAND),
        }
    }

    /// Generate a fresh problem. Answers are never negative.
    pub fn generate(&self, rng: &mut impl Rng) -> Question {
        let op = Op::ALL[rng.random_range(0..Op::ALL.len())];
        let mut a = rng.random_range(1..=self.max_operand) as i64;
        let mut b = rng.random_range(1..=self.max_operand) as i64;
        if op == Op::Sub && b > a {
            std::mem::swap(&mut a, &mut b);
        }
        let answer = match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
        };
        Question::new(format!("{} {} {}", a, op.symbol(), b), answer.to_string())
    }

    /// A wrong answer near the right one
    pub fn distractor(&self, correct: i64, rng: &mut impl Rng) -> i64 {
        let spread = (correct.saturating_abs() / 2).max(5);
        let low = correct.saturating_sub(spread).max(0);
        let high = correct.saturating_add(spread).max(low);
        let value = rng.random_range(low..=high);
        if value != correct {
            return value;
        }
        let nudge = rng.random_range(1..=3);
        match correct.checked_add(nudge) {
            Some(v) => v,
            None => correct - nudge,
        }
    }
}

/// Answer text that may arrive as a JSON string or number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawAnswer> for String {
    fn from(raw: RawAnswer) -> Self {
        match raw {
            RawAnswer::Text(s) => s,
            RawAnswer::Int(n) => n.to_string(),
            RawAnswer::Float(f) => f.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    prompt: String,
    #[serde(rename = "correctAnswer", alias = "correct_answer", alias = "answer")]
    answer: RawAnswer,
    #[serde(default)]
    distractors: Vec<RawAnswer>,
}

/// One external question as supplied by the editor backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry")]
pub struct DeckEntry {
    pub prompt: String,
    pub answer: String,
    pub distractors: Vec<String>,
}

impl From<RawEntry> for DeckEntry {
    fn from(raw: RawEntry) -> Self {
        Self {
            prompt: raw.prompt,
            answer: raw.answer.into(),
            distractors: raw.distractors.into_iter().map(Into::into).collect(),
        }
    }
}

impl DeckEntry {
    pub fn new<S: Into<String>>(
        prompt: impl Into<String>,
        answer: impl Into<String>,
        distractors: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            distractors: distractors.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    List(Vec<DeckEntry>),
    Wrapped { questions: Vec<DeckEntry> },
}

/// A validated, never-empty external question deck
#[derive(Debug, Clone)]
pub struct Deck {
    questions: Vec<Question>,
    order: Vec<usize>,
    cursor: usize,
    shuffle: bool,
    last: Option<usize>,
}

impl Deck {
    /// Prompt used when a deck has no usable entries
    pub const PLACEHOLDER_PROMPT: &'static str = "No questions yet - catch the star!";
    pub const PLACEHOLDER_ANSWER: &'static str = "★";

    /// Build a deck, dropping malformed entries.
    ///
    /// Entries without distractors borrow the other entries' answers. If no
    /// entry survives validation the deck holds a single placeholder.
    pub fn from_entries(entries: Vec<DeckEntry>, shuffle: bool) -> Self {
        let total = entries.len();
        let mut questions: Vec<Question> = Vec::with_capacity(total);

        for entry in entries {
            let prompt = entry.prompt.trim();
            let answer = entry.answer.trim();
            if prompt.is_empty() || answer.is_empty() {
                log::warn!("Dropping deck entry with empty prompt or answer: {:?}", entry.prompt);
                continue;
            }
            let mut distractors: Vec<String> = Vec::new();
            for d in &entry.distractors {
                let d = d.trim();
                if d.is_empty()
                    || answers_match(d, answer)
                    || distractors.iter().any(|seen| answers_match(seen, d))
                {
                    continue;
                }
                distractors.push(d.to_string());
            }
            questions.push(Question::new(prompt, answer).with_distractors(distractors));
        }

        if questions.is_empty() {
            log::warn!("Deck had no usable entries ({} supplied), using placeholder", total);
            return Self::placeholder();
        }
        if questions.len() < total {
            log::warn!("Deck kept {} of {} entries", questions.len(), total);
        }

        // Borrow other answers for entries that came without distractors
        let answers: Vec<String> = questions.iter().map(|q| q.answer.clone()).collect();
        for q in questions.iter_mut().filter(|q| q.distractors.is_empty()) {
            for other in &answers {
                if !answers_match(other, &q.answer)
                    && !q.distractors.iter().any(|seen| answers_match(seen, other))
                {
                    q.distractors.push(other.clone());
                }
            }
        }

        let len = questions.len();
        Self {
            questions,
            order: (0..len).collect(),
            cursor: len,
            shuffle,
            last: None,
        }
    }

    /// Parse the editor's JSON export: a list of entries or `{ "questions": [...] }`
    pub fn from_json(json: &str, shuffle: bool) -> Result<Self, BankError> {
        let entries = match serde_json::from_str::<DeckFile>(json)? {
            DeckFile::List(entries) => entries,
            DeckFile::Wrapped { questions } => questions,
        };
        Ok(Self::from_entries(entries, shuffle))
    }

    /// Load a JSON deck from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>, shuffle: bool) -> Result<Self, BankError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, shuffle)
    }

    /// Single-question deck used when nothing usable was supplied
    pub fn placeholder() -> Self {
        Self {
            questions: vec![Question::new(Self::PLACEHOLDER_PROMPT, Self::PLACEHOLDER_ANSWER)],
            order: vec![0],
            cursor: 1,
            shuffle: false,
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Next question in deck order, wrapping or reshuffling when exhausted
    pub fn next_question(&mut self, rng: &mut impl Rng) -> Question {
        if self.cursor >= self.order.len() {
            self.refill(rng);
        }
        let idx = self.order[self.cursor];
        self.cursor += 1;
        self.last = Some(idx);
        self.questions[idx].clone()
    }

    fn refill(&mut self, rng: &mut impl Rng) {
        self.cursor = 0;
        if !self.shuffle {
            return;
        }
        self.order.shuffle(rng);
        // Don't repeat the previous question across the reshuffle boundary
        let len = self.order.len();
        if len > 1 && self.last == Some(self.order[0]) {
            self.order.swap(0, len - 1);
        }
    }

    /// Rewind to a fresh pass (used when a new run starts)
    pub fn rewind(&mut self) {
        self.cursor = self.order.len();
        self.last = None;
    }
}

/// Adapter over both question sources
#[derive(Debug, Clone)]
pub enum QuestionBank {
    Arithmetic(ArithmeticGenerator),
    Deck(Deck),
}

impl QuestionBank {
    pub fn mode(&self) -> GameMode {
        match self {
            QuestionBank::Arithmetic(_) => GameMode::Arithmetic,
            QuestionBank::Deck(_) => GameMode::Deck,
        }
    }

    pub fn next_question(&mut self, rng: &mut impl Rng) -> Question {
        match self {
            QuestionBank::Arithmetic(generator) => generator.generate(rng),
            QuestionBank::Deck(deck) => deck.next_question(rng),
        }
    }

    /// A wrong answer for `question`, or `None` if it has none to offer
    pub fn distractor(&self, question: &Question, rng: &mut impl Rng) -> Option<String> {
        if let QuestionBank::Arithmetic(generator) = self {
            if let Ok(correct) = question.answer.parse::<i64>() {
                return Some(generator.distractor(correct, rng).to_string());
            }
        }
        question.distractors.choose(rng).cloned()
    }
}
