use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use tarn_core::{Op, Value, Vm};
use tarn_fs::{open_filesystem, tag, CopyOptions};

fn boxed(vm: &mut Vm, bits: u32) -> Value {
    vm.box_foreign(tag::COPY_OPTIONS, CopyOptions(bits))
}

fn bits_of(vm: &Vm, v: &Value) -> u32 {
    vm.foreign::<CopyOptions>(v, tag::COPY_OPTIONS).unwrap().0
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, .. ProptestConfig::default()
    })]

    #[test]
    fn combination_is_commutative_and_associative(
        a in any::<u32>(),
        b in any::<u32>(),
        c in any::<u32>(),
    ) {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let (va, vb, vc) = (boxed(&mut vm, a), boxed(&mut vm, b), boxed(&mut vm, c));

        let ab = vm.call_operator(Op::BOr, &[va.clone(), vb.clone()]).unwrap()[0].clone();
        let ba = vm.call_operator(Op::BOr, &[vb.clone(), va.clone()]).unwrap()[0].clone();
        prop_assert_eq!(bits_of(&vm, &ab), bits_of(&vm, &ba));

        let ab_c = vm.call_operator(Op::BOr, &[ab, vc.clone()]).unwrap()[0].clone();
        let bc = vm.call_operator(Op::BOr, &[vb, vc]).unwrap()[0].clone();
        let a_bc = vm.call_operator(Op::BOr, &[va, bc]).unwrap()[0].clone();
        prop_assert_eq!(bits_of(&vm, &ab_c), bits_of(&vm, &a_bc));
    }

    #[test]
    fn complement_is_involutive(a in any::<u32>()) {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let va = boxed(&mut vm, a);
        let n = vm.call_operator(Op::BNot, &[va.clone()]).unwrap()[0].clone();
        let nn = vm.call_operator(Op::BNot, &[n]).unwrap()[0].clone();
        prop_assert_eq!(bits_of(&vm, &nn), a);
        let eq = vm.call_operator(Op::Eq, &[nn, va]).unwrap();
        prop_assert!(matches!(eq[0], Value::Bool(true)));
    }

    #[test]
    fn masking_never_adds_bits(a in any::<u32>(), b in any::<u32>()) {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let (va, vb) = (boxed(&mut vm, a), boxed(&mut vm, b));
        let masked = vm.call_operator(Op::BAnd, &[va, vb]).unwrap()[0].clone();
        let bits = bits_of(&vm, &masked);
        prop_assert_eq!(bits & !a, 0);
        prop_assert_eq!(bits & !b, 0);
    }
}
