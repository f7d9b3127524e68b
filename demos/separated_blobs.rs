use cure::{Clustering, Cure};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Four groups of ten points along the x axis, near 0, 3, 5 and 8.
    let mut data: Vec<Vec<f32>> = Vec::new();
    for offset in [0.0f32, 3.0, 5.0, 8.0] {
        for i in 0..10 {
            data.push(vec![offset + 0.1 * i as f32, 0.05 * (i % 3) as f32]);
        }
    }

    let cure = Cure::new(4).with_representatives(5).with_compression(0.5);
    let fit = cure.fit(&data)?;

    println!("n_points={} n_clusters={}", fit.n_points(), fit.n_clusters());
    for (i, (members, mean)) in fit.clusters().iter().zip(fit.means()).enumerate() {
        println!(
            "  cluster {}: size={} mean=({:.2}, {:.2}) reps={}",
            i,
            members.len(),
            mean[0],
            mean[1],
            fit.representatives()[i].len()
        );
    }

    // Same result through the generic clustering interface.
    let labels = cure.fit_predict(&data)?;
    println!("labels={:?}", labels);

    if let Some(last) = fit.merges().last() {
        println!(
            "last merge: {} + {} at distance {:.3} (size {})",
            last.left, last.right, last.distance, last.size
        );
    }

    Ok(())
}
