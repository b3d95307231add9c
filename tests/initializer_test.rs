use cpkdeploy::initializer::{self, SetupCall, SetupFields};
use ethcontract::{H160, U256};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_address(rng: &mut StdRng) -> H160 {
  H160::from(rng.gen::<[u8; 20]>())
}

fn random_fields(rng: &mut StdRng) -> SetupFields {
  let n = rng.gen_range(1..=8);
  let owners = (0..n)
    .map(|_| format!("{:?}", random_address(rng)))
    .collect();
  let data_len = rng.gen_range(0..100);
  let data: Vec<u8> = (0..data_len).map(|_| rng.gen()).collect();
  SetupFields {
    owners,
    threshold: rng.gen_range(1..=n as u64),
    to: format!("{:?}", random_address(rng)),
    data: format!("0x{}", hex::encode(data)),
    fallback_handler: format!("{:?}", random_address(rng)),
    payment_token: format!("{:?}", random_address(rng)),
    payment: rng.gen::<u128>().to_string(),
    payment_receiver: format!("{:?}", random_address(rng)),
  }
}

#[test]
fn encoding_is_deterministic() {
  let mut rng = StdRng::seed_from_u64(7);
  for _ in 0..20 {
    let fields = random_fields(&mut rng);
    let first = initializer::encode(&fields).expect("couldnt encode");
    let second = initializer::encode(&fields.clone()).expect("couldnt encode");
    assert_eq!(first, second);
  }
}

#[test]
fn decoding_recovers_setup_fields() -> anyhow::Result<()> {
  let mut rng = StdRng::seed_from_u64(1337);
  for _ in 0..50 {
    let fields = random_fields(&mut rng);
    let payload = initializer::encode(&fields)?;
    assert_eq!(payload[..4], [0xb6, 0x3e, 0x80, 0x0d]);

    let decoded = SetupCall::decode(&payload)?;
    assert_eq!(decoded, SetupCall::parse(&fields)?);
    assert_eq!(decoded.owners.len(), fields.owners.len());
    assert!(decoded.threshold >= U256::one());
    assert!(decoded.threshold <= U256::from(fields.owners.len()));
    assert_eq!(
      format!("0x{}", hex::encode(&decoded.data)),
      fields.data
    );
    assert_eq!(decoded.payment.to_string(), fields.payment);
  }
  Ok(())
}
