//! Frame feed - background decoding into a bounded queue.
//!
//! The feed thread turns a playlist of image files into a stream of frames,
//! the way a capture device would. Batches are decoded in parallel and
//! pushed into a bounded channel; when the display falls behind, the feed
//! blocks instead of piling up memory. Dropping the receiver stops it.

use crate::decode::Decoder;
use crossbeam_channel::{bounded, Receiver, Sender};
use fitblit::config::FeedConfig;
use fitblit::ImageBuf;
use log::{debug, info};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// One decoded frame of the feed.
#[derive(Debug)]
pub struct Frame {
    /// Position in the playlist
    pub index: usize,
    /// File name shown in the window title
    pub name: String,
    pub image: ImageBuf,
}

/// Spawn the feed thread.
pub fn spawn_feed(
    paths: Vec<PathBuf>,
    decoder: Arc<Decoder>,
    config: FeedConfig,
) -> (Receiver<Frame>, thread::JoinHandle<()>) {
    let (tx, rx) = bounded(config.queue_depth.max(1));
    let handle = thread::spawn(move || {
        feed_loop(&paths, &decoder, &config, &tx);
        debug!("feed stopped");
    });
    (rx, handle)
}

/// Decode and send frames until the playlist ends or the receiver is gone
fn feed_loop(paths: &[PathBuf], decoder: &Decoder, config: &FeedConfig, tx: &Sender<Frame>) {
    loop {
        let mut sent = 0;
        for (batch_no, batch) in paths.chunks(config.decode_batch.max(1)).enumerate() {
            let first = batch_no * config.decode_batch.max(1);
            for frame in decode_batch(batch, first, decoder) {
                if tx.send(frame).is_err() {
                    return;
                }
                sent += 1;
            }
        }

        if !config.loop_playback {
            info!("feed finished after {sent} frames");
            return;
        }
        if sent == 0 {
            // Nothing decodable; looping would spin
            info!("no decodable frames in playlist");
            return;
        }
    }
}

/// Decode one batch in parallel, keeping playlist order
fn decode_batch(batch: &[PathBuf], first: usize, decoder: &Decoder) -> Vec<Frame> {
    batch
        .par_iter()
        .enumerate()
        .filter_map(|(offset, path)| {
            let image = decoder.decode(path)?;
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            Some(Frame {
                index: first + offset,
                name,
                image,
            })
        })
        .collect()
}
