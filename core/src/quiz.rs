//! Multiple-choice vocabulary quiz over the words of one film.
//!
//! Each question shows a word and offers its translation mixed with up to
//! three other translations taken from the same film. Only the first pick
//! per question counts.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cinema::MovieWord;

const MAX_DISTRACTORS: usize = 3;

#[derive(Debug, Clone)]
pub struct MovieQuiz {
    words: Vec<MovieWord>,
    current: usize,
    score: usize,
    options: Vec<String>,
    choice: Option<String>,
}

impl MovieQuiz {
    pub fn new(words: Vec<MovieWord>) -> Self {
        Self::with_rng(words, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(words: Vec<MovieWord>, rng: &mut R) -> Self {
        let mut quiz = Self {
            words,
            current: 0,
            score: 0,
            options: Vec::new(),
            choice: None,
        };
        quiz.deal_options(rng);
        quiz
    }

    pub fn current_word(&self) -> Option<&MovieWord> {
        self.words.get(self.current)
    }

    /// Shuffled answers for the current word. Empty once finished.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The pick made for the current word, if any.
    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    /// Record a pick and report whether it is correct. A second pick on the
    /// same word is ignored and returns false.
    pub fn answer(&mut self, choice: &str) -> bool {
        if self.choice.is_some() {
            return false;
        }
        let Some(word) = self.words.get(self.current) else {
            return false;
        };
        let correct = word.translation == choice;
        if correct {
            self.score += 1;
        }
        self.choice = Some(choice.to_string());
        correct
    }

    /// Move to the next word. Returns false when the quiz is over.
    pub fn advance(&mut self) -> bool {
        self.advance_with(&mut rand::thread_rng())
    }

    pub fn advance_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_finished() {
            return false;
        }
        self.current += 1;
        self.choice = None;
        self.deal_options(rng);
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.words.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.words.len()
    }

    /// Share of words answered so far, for the progress bar.
    pub fn progress(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        self.current.min(self.words.len()) as f64 / self.words.len() as f64
    }

    /// Correct picks over all words; 0 for an empty quiz.
    pub fn percentage(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        self.score as f64 / self.words.len() as f64
    }

    fn deal_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(word) = self.words.get(self.current) else {
            self.options.clear();
            return;
        };
        let correct = word.translation.as_str();
        let mut pool: Vec<&str> = Vec::new();
        for other in &self.words {
            let t = other.translation.as_str();
            if t != correct && !pool.contains(&t) {
                pool.push(t);
            }
        }
        pool.shuffle(rng);

        let mut options: Vec<String> = pool.into_iter().take(MAX_DISTRACTORS).map(str::to_string).collect();
        options.push(correct.to_string());
        options.shuffle(rng);
        self.options = options;
    }
}
