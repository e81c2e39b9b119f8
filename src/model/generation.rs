use serde::Deserialize;

/// Decoding constraints for one model call.
///
/// Lengths count decoder tokens including the decoder start token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_length: usize,
    pub min_length: usize,
    /// 0 disables n-gram blocking
    pub no_repeat_ngram_size: usize,
}

impl GenerationParams {
    /// Fixed settings used for every chunk summary
    pub const SUMMARY: GenerationParams = GenerationParams {
        max_length: 130,
        min_length: 30,
        no_repeat_ngram_size: 3,
    };
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::SUMMARY
    }
}

/// Token ids that steer decoding; defaults match BART checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecialTokens {
    pub bos_token_id: u32,
    pub eos_token_id: u32,
    pub pad_token_id: u32,
    pub decoder_start_token_id: u32,
    pub forced_bos_token_id: Option<u32>,
    pub max_position_embeddings: usize,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            bos_token_id: 0,
            eos_token_id: 2,
            pad_token_id: 1,
            decoder_start_token_id: 2,
            forced_bos_token_id: Some(0),
            max_position_embeddings: 1024,
        }
    }
}

/// Index of the largest logit; the first one wins ties. NaN never wins.
pub fn argmax(logits: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in logits.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Tokens that would complete an n-gram already present in `sequence`.
pub fn banned_ngram_tokens(sequence: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || sequence.len() + 1 < n {
        return Vec::new();
    }
    let prefix_len = n - 1;
    let prefix = &sequence[sequence.len() - prefix_len..];

    let mut banned = Vec::new();
    for window in sequence.windows(n) {
        if &window[..prefix_len] == prefix {
            let token = window[prefix_len];
            if !banned.contains(&token) {
                banned.push(token);
            }
        }
    }
    banned
}

fn mask(logits: &mut [f32], token: u32) {
    if let Some(slot) = logits.get_mut(token as usize) {
        *slot = f32::NEG_INFINITY;
    }
}

/// Greedy (argmax) autoregressive decoding state.
///
/// Feed it the logits for the last position after each decoder call; it
/// applies the forced BOS, minimum length and n-gram rules, then appends the
/// chosen token.
#[derive(Debug, Clone)]
pub struct GreedySearch {
    params: GenerationParams,
    special: SpecialTokens,
    sequence: Vec<u32>,
    finished: bool,
}

impl GreedySearch {
    pub fn new(params: GenerationParams, special: SpecialTokens) -> Self {
        Self {
            params,
            special,
            sequence: vec![special.decoder_start_token_id],
            finished: params.max_length <= 1,
        }
    }

    /// Decoder input ids for the next call
    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Generated ids without the decoder start token
    pub fn output_tokens(&self) -> &[u32] {
        &self.sequence[1..]
    }

    /// Picks the next token from `logits` and returns it.
    pub fn step(&mut self, logits: &mut [f32]) -> Option<u32> {
        if self.finished {
            return None;
        }

        let cur_len = self.sequence.len();
        let next = match self.special.forced_bos_token_id {
            Some(bos) if cur_len == 1 => Some(bos),
            _ => {
                if cur_len < self.params.min_length {
                    mask(logits, self.special.eos_token_id);
                }
                for token in banned_ngram_tokens(&self.sequence, self.params.no_repeat_ngram_size) {
                    mask(logits, token);
                }
                argmax(logits)
                    .filter(|&idx| logits[idx].is_finite())
                    .map(|idx| idx as u32)
            }
        };

        match next {
            Some(token) => {
                self.sequence.push(token);
                if token == self.special.eos_token_id || self.sequence.len() >= self.params.max_length {
                    self.finished = true;
                }
            }
            None => self.finished = true,
        }
        next
    }
}
