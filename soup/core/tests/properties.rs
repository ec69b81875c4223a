use proptest::prelude::*;
use soup_core::{
    complement_of, execute_step, resolve_template, wrap, Cpu, Dispatch, Soup, Template,
    SOUP_SIZE, STACK_SIZE,
};

proptest! {
    #[test]
    fn wrap_is_idempotent_and_periodic(address in any::<i32>(), k in -4i64..4) {
        let address = address as i64;
        let once = wrap(address);
        prop_assert!(once < SOUP_SIZE);
        prop_assert_eq!(wrap(once as i64), once);
        prop_assert_eq!(wrap(address + k * SOUP_SIZE as i64), once);
    }

    #[test]
    fn complement_is_an_involution(len in 0u32..=8, raw in any::<u8>()) {
        let mask = if len >= 8 { 0xff } else { (1u8 << len) - 1 };
        let bits = raw & mask;
        let once = complement_of(bits, len);
        prop_assert_eq!(once & !mask, 0);
        prop_assert_eq!(complement_of(once, len), bits);
    }

    #[test]
    fn resolver_reads_marker_runs_msb_first(
        markers in prop::collection::vec(0u8..=1, 0..=8),
        position in 0i64..SOUP_SIZE as i64,
    ) {
        let mut soup = Soup::new();
        soup.write_slice(position + 1, &markers);
        soup.write(position + 1 + markers.len() as i64, 0x04);
        let bits = markers.iter().fold(0u8, |acc, bit| (acc << 1) | bit);
        prop_assert_eq!(
            resolve_template(&soup, position),
            Template::new(bits, markers.len() as u32)
        );
    }

    #[test]
    fn stack_pointer_stays_in_bounds(program in prop::collection::vec(0x0cu8..=0x13, 1..64)) {
        let dispatch = Dispatch::standard();
        let mut soup = Soup::new();
        soup.write_slice(0, &program);
        let mut cpu = Cpu::new();
        for _ in 0..program.len() {
            execute_step(&dispatch, &mut cpu, &mut soup);
            prop_assert!(cpu.sp < STACK_SIZE);
        }
        prop_assert_eq!(cpu.ip, program.len() as i64);
    }

    #[test]
    fn arbitrary_bytes_never_panic(
        program in prop::collection::vec(any::<u8>(), 1..48),
        start in any::<i32>(),
    ) {
        let dispatch = Dispatch::standard();
        let mut soup = Soup::new();
        soup.write_slice(0, &[0x04; 256]);
        soup.write_slice(0, &program);
        let mut cpu = Cpu::at(start as i64 % 64);
        for _ in 0..program.len() {
            execute_step(&dispatch, &mut cpu, &mut soup);
            prop_assert!(cpu.ip >= 0 && (cpu.ip as usize) < SOUP_SIZE);
        }
    }
}
