//! Measures PLY read (parse) speed for all three encodings.

use std::io::Cursor;
use criterion::{
    criterion_group, criterion_main, black_box, Criterion, Throughput,
};

use ply_reader::{Reader, Schema};


/// Generates a grid mesh with `n * n` vertices (position + color) and
/// `2 * (n - 1)^2` triangles in the given encoding.
fn grid(n: u32, format: &str) -> Vec<u8> {
    let num_faces = 2 * (n - 1) * (n - 1);
    let mut out = format!(
        "ply\n\
            format {} 1.0\n\
            comment generated grid\n\
            element vertex {}\n\
            property float x\n\
            property float y\n\
            property float z\n\
            property uchar red\n\
            property uchar green\n\
            property uchar blue\n\
            element face {}\n\
            property list uchar uint vertex_indices\n\
            end_header\n",
        format,
        n * n,
        num_faces,
    ).into_bytes();

    let mut faces = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            faces.push([i, i + 1, i + n]);
            faces.push([i + 1, i + n + 1, i + n]);
        }
    }

    let put = |out: &mut Vec<u8>, v: &[u8]| out.extend_from_slice(v);
    let color = |i: u32| (i % 256) as u8;
    match format {
        "ascii" => {
            for i in 0..n * n {
                let line = format!(
                    "{} {} {} {} {} {}\n",
                    (i % n) as f32 * 0.5,
                    (i / n) as f32 * 0.5,
                    ((i % 7) as f32).sin(),
                    color(i), color(i + 85), color(i + 170),
                );
                put(&mut out, line.as_bytes());
            }
            for f in &faces {
                put(&mut out, format!("3 {} {} {}\n", f[0], f[1], f[2]).as_bytes());
            }
        }
        _ => {
            let le = format == "binary_little_endian";
            let f32_bytes = |v: f32| if le { v.to_le_bytes() } else { v.to_be_bytes() };
            let u32_bytes = |v: u32| if le { v.to_le_bytes() } else { v.to_be_bytes() };

            for i in 0..n * n {
                put(&mut out, &f32_bytes((i % n) as f32 * 0.5));
                put(&mut out, &f32_bytes((i / n) as f32 * 0.5));
                put(&mut out, &f32_bytes(((i % 7) as f32).sin()));
                put(&mut out, &[color(i), color(i + 85), color(i + 170)]);
            }
            for f in &faces {
                put(&mut out, &[3]);
                for &idx in f {
                    put(&mut out, &u32_bytes(idx));
                }
            }
        }
    }

    out
}

fn read(data: &[u8]) -> Schema {
    Reader::new(Cursor::new(data))
        .and_then(|reader| reader.read())
        .expect("failed to read generated file")
}

fn read_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_grid");

    for &format in &["ascii", "binary_little_endian", "binary_big_endian"] {
        let data = grid(200, format);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format, |b| b.iter(|| black_box(read(black_box(&data)))));
    }

    group.finish();
}

fn header_only(c: &mut Criterion) {
    let data = grid(2, "binary_little_endian");
    c.bench_function("header_only", |b| {
        b.iter(|| black_box(Reader::new(Cursor::new(black_box(&data[..]))).map(|r| r.encoding())))
    });
}


criterion_group!(benches, read_grid, header_only);
criterion_main!(benches);
