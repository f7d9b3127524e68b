#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::{Clustering, Cure, CureFit, Error, Result};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Ten points near each of the offsets 0, 3, 5 and 8 on the first axis.
    fn four_blobs(seed: u64, dims: usize) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = Vec::new();
        for offset in [0.0f32, 3.0, 5.0, 8.0] {
            for i in 0..10 {
                let mut point = vec![offset + 0.1 * i as f32 + rng.random::<f32>() * 0.01];
                point.extend((1..dims).map(|_| rng.random::<f32>() * 0.01));
                data.push(point);
            }
        }
        data
    }

    fn sorted_members(fit: &CureFit) -> Vec<usize> {
        let mut all: Vec<usize> = fit.clusters().iter().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    fn check_partition(fit: &CureFit, n: usize, k: usize, r: usize) {
        assert_eq!(fit.n_clusters(), k);
        assert_eq!(fit.n_points(), n);
        assert_eq!(sorted_members(fit), (0..n).collect::<Vec<_>>());
        assert_eq!(fit.merges().len(), n - k);
        for (members, reps) in fit.clusters().iter().zip(fit.representatives()) {
            assert!(!members.is_empty());
            assert!(!reps.is_empty() && reps.len() <= r);
        }
    }

    #[test]
    fn test_separated_blob_recovery() -> Result<()> {
        for (seed, dims) in [(1, 1), (2, 1), (3, 2), (4, 3)] {
            let data = four_blobs(seed, dims);
            let fit = Cure::new(4).fit(&data)?;
            check_partition(&fit, 40, 4, 5);

            for members in fit.clusters() {
                assert_eq!(members.len(), 10);
                let group = members[0] / 10;
                assert!(members.iter().all(|&m| m / 10 == group), "{members:?}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_k_equals_one_collapses_everything() -> Result<()> {
        let data = four_blobs(11, 2);
        let fit = Cure::new(1).fit(&data)?;
        check_partition(&fit, 40, 1, 5);
        assert_eq!(fit.labels(), vec![0; 40]);
        Ok(())
    }

    #[test]
    fn test_k_equals_n_is_identity() -> Result<()> {
        let data = four_blobs(12, 2);
        let fit = Cure::new(40).fit(&data)?;
        check_partition(&fit, 40, 40, 5);

        let mut singletons: Vec<Vec<usize>> = fit.clusters().to_vec();
        singletons.sort();
        assert_eq!(singletons, (0..40).map(|i| vec![i]).collect::<Vec<_>>());
        for (members, mean) in fit.clusters().iter().zip(fit.means()) {
            let point = &data[members[0]];
            for (m, &x) in mean.iter().zip(point) {
                assert_eq!(*m, f64::from(x));
            }
        }
        Ok(())
    }

    #[test]
    fn test_coincident_points() -> Result<()> {
        let data = vec![vec![1.0, 1.0]; 6];
        let fit = Cure::new(2).with_representatives(3).fit(&data)?;
        check_partition(&fit, 6, 2, 3);
        Ok(())
    }

    #[test]
    fn test_coincident_points_across_groups() -> Result<()> {
        let mut data = vec![vec![0.0, 0.0]; 4];
        data.extend(vec![vec![7.0, 7.0]; 3]);
        let fit = Cure::new(2).fit(&data)?;
        let mut sizes: Vec<usize> = fit.clusters().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4]);
        Ok(())
    }

    #[test]
    fn test_representatives_beat_centroids_on_elongated_shape() -> Result<()> {
        // A long horizontal bar next to a small blob that is closer to the
        // bar's centroid than the bar's ends are to each other.
        let mut data: Vec<Vec<f32>> = (0..21).map(|i| vec![i as f32 * 0.5, 0.0]).collect();
        data.extend((0..5).map(|i| vec![5.0 + 0.1 * i as f32, 3.0]));

        let fit = Cure::new(2)
            .with_representatives(8)
            .with_compression(0.2)
            .fit(&data)?;
        let labels = fit.labels();
        assert!(labels[..21].iter().all(|&l| l == labels[0]));
        assert!(labels[21..].iter().all(|&l| l == labels[21]));
        assert_ne!(labels[0], labels[21]);
        Ok(())
    }

    #[test]
    fn test_zero_compression_keeps_member_coordinates() -> Result<()> {
        let data = four_blobs(5, 2);
        let fit = Cure::new(4).with_compression(0.0).fit(&data)?;
        for (members, reps) in fit.clusters().iter().zip(fit.representatives()) {
            for rep in reps {
                assert!(members.iter().any(|&m| {
                    data[m]
                        .iter()
                        .zip(rep.iter())
                        .all(|(&x, &r)| f64::from(x) == r)
                }));
            }
        }
        Ok(())
    }

    #[test]
    fn test_full_compression_puts_representatives_on_mean() -> Result<()> {
        let data = four_blobs(6, 2);
        let fit = Cure::new(4).with_compression(1.0).fit(&data)?;
        for (reps, mean) in fit.representatives().iter().zip(fit.means()) {
            assert!(reps.iter().all(|rep| rep == mean));
        }
        Ok(())
    }

    #[test]
    fn test_invalid_input_is_rejected_up_front() {
        let data = four_blobs(7, 2);
        assert!(matches!(
            Cure::new(41).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(Cure::new(4).with_compression(2.0).fit_predict(&data).is_err());
        assert!(Cure::new(4).with_representatives(0).fit_predict(&data).is_err());
    }

    fn dataset() -> impl Strategy<Value = Vec<Vec<f32>>> {
        (1usize..4).prop_flat_map(|dim| {
            proptest::collection::vec(proptest::collection::vec(-50.0f32..50.0, dim), 1..40)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn cure_partitions_every_point_exactly_once(
            data in dataset(),
            k_seed in 0usize..1000,
            r in 1usize..7,
            c in 0.0f64..=1.0,
        ) {
            let n = data.len();
            let k = 1 + k_seed % n;
            let fit = Cure::new(k)
                .with_representatives(r)
                .with_compression(c)
                .fit(&data)
                .unwrap();
            check_partition(&fit, n, k, r);

            // Means are exact centroids of their members.
            for (members, mean) in fit.clusters().iter().zip(fit.means()) {
                for (j, m) in mean.iter().enumerate() {
                    let expected = members.iter().map(|&i| f64::from(data[i][j])).sum::<f64>()
                        / members.len() as f64;
                    prop_assert!((m - expected).abs() < 1e-6, "{m} vs {expected}");
                }
            }
        }

        #[test]
        fn cure_is_deterministic(
            data in dataset(),
            k_seed in 0usize..1000,
            r in 1usize..7,
            c in 0.0f64..=1.0,
        ) {
            let k = 1 + k_seed % data.len();
            let cure = Cure::new(k).with_representatives(r).with_compression(c);
            let first = cure.fit(&data).unwrap();
            let second = cure.fit(&data).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn cure_merge_distances_match_sizes(
            data in dataset(),
            r in 1usize..7,
        ) {
            let fit = Cure::new(1).with_representatives(r).fit(&data).unwrap();
            let n = data.len();
            let mut sizes: Vec<usize> = vec![1; n];
            for step in fit.merges() {
                prop_assert!(step.distance.is_finite() && step.distance >= 0.0);
                prop_assert_eq!(step.size, sizes[step.left] + sizes[step.right]);
                sizes.push(step.size);
            }
            prop_assert_eq!(fit.clusters()[0].len(), n);
        }
    }
}
