use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use chirp_blob::{BlobStore, FileStore};

fn bench_put_1kb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    let data = vec![0xABu8; 1024];

    c.bench_function("blob_put_1kb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("media/{}/photo.jpg", i);
            store.put(black_box(&key), black_box(&data)).unwrap();
            i += 1;
        });
    });
}

fn bench_put_1mb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    let data = vec![0xABu8; 1024 * 1024];

    c.bench_function("blob_put_1mb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("media/{}/photo.jpg", i);
            store.put(black_box(&key), black_box(&data)).unwrap();
            i += 1;
        });
    });
}

fn bench_get_1kb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    let data = vec![0xABu8; 1024];

    for i in 0..1000 {
        let key = format!("media/{}/photo.jpg", i);
        store.put(&key, &data).unwrap();
    }

    c.bench_function("blob_get_1kb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("media/{}/photo.jpg", i % 1000);
            let _ = store.get(black_box(&key)).unwrap();
            i += 1;
        });
    });
}

criterion_group!(benches, bench_put_1kb, bench_put_1mb, bench_get_1kb);
criterion_main!(benches);
