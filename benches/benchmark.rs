use aarch64disas::{compile_instruction_table, disasm, Host};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

struct VecHost<'a> {
    words: &'a [u32],
}

impl<'a> Host for VecHost<'a> {
    fn read_word(&mut self, addr: u64) -> u32 {
        self.words[(addr / 4) as usize]
    }
    fn print(&mut self, _text: &str) {}
}

/// A representative mix of arithmetic, load/store, and bitmask-immediate
/// encodings, repeated to give the linear table scan a realistic spread of
/// best-case and worst-case (falls through to the last entry) lookups.
fn sample_program() -> Vec<u32> {
    vec![
        0x0b020020, // add w0, w1, w2
        0x8b020c20, // add x0, x1, x2, lsl #3
        0x910003e0, // mov x0, sp
        0xf9400820, // ldr x0, [x1, #16]
        0xf8626820, // ldr x0, [x1, x2]
        0x58000080, // ldr x0, <literal>
        0xb2400020, // orr x0, x1, #0x1
        0xeb21c41f, // cmp x0, w1, sxtw #1
        0xaa020020, // orr x0, x1, x2
        0xffffffff, // undefined
    ]
}

pub fn benchmark(c: &mut Criterion) {
    compile_instruction_table();
    let words = sample_program();

    let mut g = c.benchmark_group("group");
    g.sample_size(20);
    g.measurement_time(Duration::from_secs(60));

    g.bench_function("disasm_mixed_instruction_stream", |b| {
        b.iter(|| {
            let mut host = VecHost { words: &words };
            let mut loc = 0u64;
            for _ in 0..words.len() {
                loc = black_box(disasm(&mut host, loc, false));
            }
        })
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
