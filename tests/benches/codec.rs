use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyer_core::morse::{encode_char, index_of, path_to, MAX_INDEX};
use keyer_core::{Element, Instant, MorseDecoder, TimingProfile};

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_char alphabet", |b| {
        b.iter(|| {
            for ch in "THE QUICK BROWN FOX 0123456789".chars() {
                black_box(encode_char(black_box(ch)));
            }
        })
    });

    c.bench_function("path_to whole tree", |b| {
        b.iter(|| {
            for index in 1..=MAX_INDEX {
                black_box(path_to(black_box(index)));
            }
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let timing = TimingProfile::from_wpm(20);
    let dit = timing.dit.as_millis();

    // element stream for "PARIS " with its gaps
    let mut stream: Vec<(Option<Element>, u64)> = Vec::new();
    let mut now = 0;
    for ch in "PARIS".chars() {
        let index = index_of(ch).unwrap_or(0);
        for &element in path_to(index).iter() {
            now += dit * (element.duration_units() as u64 + 1);
            stream.push((Some(element), now));
        }
        now += 2 * dit + 1;
        stream.push((None, now));
    }
    now += 6 * dit;
    stream.push((None, now));

    c.bench_function("decode PARIS", |b| {
        b.iter(|| {
            let mut decoder = MorseDecoder::new(Instant::from_millis(0));
            let mut out = heapless::String::<16>::new();
            for &(played, at) in &stream {
                if let Some(ch) = decoder.decode(played, Instant::from_millis(at), &timing) {
                    out.push(ch).ok();
                }
            }
            black_box(out)
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
