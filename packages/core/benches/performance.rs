//! Performance benchmarks for Folio core operations
//!
//! Run with: `cargo bench -p folio-core`
//!
//! These benchmarks measure the paths a large project exercises on every
//! interaction:
//! - Reordering (drag-and-drop moves across a long block sequence)
//! - Block sequence encode/decode (every load and save)
//! - A full save with concurrent image uploads

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_core::editor::{move_block, DocumentState};
use folio_core::models::{
    BlockContent, BlockKind, ContentBlock, DraftContent, ImageContent, PendingUpload,
    ProjectFields,
};
use folio_core::persistence::{decode_blocks, encode_blocks, ProjectRepository};
use folio_core::store::{MemoryFileStorage, MemoryRecordStore};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Generate a sequence cycling through every block kind
fn generate_blocks(count: usize) -> Vec<ContentBlock> {
    (0..count)
        .map(|i| ContentBlock::new(BlockKind::ALL[i % BlockKind::ALL.len()]))
        .collect()
}

fn bench_reorder(c: &mut Criterion) {
    let blocks = generate_blocks(1000);
    let first = blocks[0].id().to_string();
    let last = blocks[999].id().to_string();

    c.bench_function("move_block last to first (1000 blocks)", |b| {
        b.iter(|| {
            let moved = move_block(black_box(blocks.clone()), &last, &first);
            black_box(moved)
        })
    });

    c.bench_function("document reorder round trip (1000 blocks)", |b| {
        let mut doc = DocumentState::from_blocks(blocks.clone());
        b.iter(|| {
            doc.reorder(&last, &first);
            doc.reorder(&last, &first);
        })
    });
}

fn bench_codec(c: &mut Criterion) {
    let blocks = generate_blocks(1000);
    let encoded = encode_blocks(&blocks).unwrap();

    c.bench_function("encode_blocks (1000 blocks)", |b| {
        b.iter(|| encode_blocks(black_box(&blocks)).unwrap())
    });

    c.bench_function("decode_blocks (1000 blocks)", |b| {
        b.iter(|| decode_blocks(Some(black_box(&encoded))).unwrap())
    });
}

fn bench_save_with_uploads(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repository = ProjectRepository::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryFileStorage::new()),
    );
    let fields = ProjectFields::new("Benchmark project", "benchmark-project");

    let mut doc = DocumentState::from_blocks(generate_blocks(200));
    let image_ids: Vec<String> = doc
        .blocks()
        .iter()
        .filter(|b| b.kind() == Some(BlockKind::Image))
        .map(|b| b.id().to_string())
        .collect();
    for (i, id) in image_ids.iter().enumerate() {
        let change = DraftContent::new(BlockContent::Image(ImageContent::default()))
            .with_pending_upload(Some(PendingUpload::new(
                format!("image-{}.png", i),
                vec![0u8; 4096],
            )));
        doc.update(id, change);
    }

    c.bench_function("save 200 blocks with 40 uploads", |b| {
        b.iter(|| {
            rt.block_on(async {
                repository
                    .save(None, &fields, black_box(doc.blocks()))
                    .await
                    .unwrap()
            })
        })
    });
}

criterion_group!(benches, bench_reorder, bench_codec, bench_save_with_uploads);
criterion_main!(benches);
