use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// XLM-RoBERTa padding token.
const PAD_ID: u32 = 1;

/// Tokenize a batch into `[batch, len]` id and mask tensors.
///
/// Sequences are cut at `max_len` and padded to the longest one in the batch.
pub fn tokenize_batch(
    tokenizer: &Tokenizer,
    texts: &[String],
    max_len: usize,
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        ids.truncate(max_len);
        mask.truncate(max_len);
        rows.push((ids, mask));
    }
    let len = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);

    let mut all_ids = Vec::with_capacity(rows.len() * len);
    let mut all_mask = Vec::with_capacity(rows.len() * len);
    for (ids, mask) in rows {
        let pad = len - ids.len();
        all_ids.extend(ids.into_iter().chain(std::iter::repeat(PAD_ID).take(pad)));
        all_mask.extend(mask.into_iter().chain(std::iter::repeat(0).take(pad)));
    }
    let input_ids = Tensor::from_vec(all_ids, (texts.len(), len), device)?;
    let attention_mask = Tensor::from_vec(all_mask, (texts.len(), len), device)?;
    Ok((input_ids, attention_mask))
}
