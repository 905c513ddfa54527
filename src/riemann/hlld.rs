//! HLLD approximate Riemann solver for adiabatic MHD.
//!
//! Reference: T. Miyoshi & K. Kusano, "A multi-state HLL approximate Riemann
//! solver for ideal magnetohydrodynamics", JCP 208, 315 (2005).
//!
//! The Riemann fan is approximated by four intermediate states separated by
//! the two fast waves `S_L`, `S_R`, the two rotational discontinuities
//! `S*_L`, `S*_R`, and the entropy wave `S_M`. When the normal field
//! vanishes the rotational discontinuities collapse onto the contact and the
//! solver reduces to HLLC.

use crate::eos::{cfast, EquationOfState};
use crate::state::{Cons1D, Prim1D, NSCALARS};

use super::{physical_flux, upwind_scalars};

/// Threshold below which the rotational-discontinuity denominators are
/// considered degenerate.
const SMALL: f64 = 1.0e-12;

struct Star {
    d: f64,
    vy: f64,
    vz: f64,
    by: f64,
    bz: f64,
    e: f64,
}

/// One-sided star state behind the fast wave `sk`.
#[allow(clippy::too_many_arguments)]
fn star_state(
    u: &Cons1D,
    w: &Prim1D,
    bx: f64,
    sk: f64,
    sm: f64,
    pt: f64,
    pt_star: f64,
) -> Star {
    let d_star = u.d * (sk - w.vx) / (sk - sm);
    let denom = u.d * (sk - w.vx) * (sk - sm) - bx * bx;

    let (vy, vz, by, bz) = if denom.abs() < SMALL * pt_star.abs().max(1.0) {
        // Degenerate case: the jump across the rotational wave vanishes.
        (w.vy, w.vz, w.by, w.bz)
    } else {
        let coeff_v = bx * (sm - w.vx) / denom;
        let coeff_b = (u.d * (sk - w.vx) * (sk - w.vx) - bx * bx) / denom;
        (
            w.vy - w.by * coeff_v,
            w.vz - w.bz * coeff_v,
            w.by * coeff_b,
            w.bz * coeff_b,
        )
    };

    let vdotb = w.vx * bx + w.vy * w.by + w.vz * w.bz;
    let vdotb_star = sm * bx + vy * by + vz * bz;
    let e = ((sk - w.vx) * u.e - pt * w.vx + pt_star * sm + bx * (vdotb - vdotb_star))
        / (sk - sm);

    Star {
        d: d_star,
        vy,
        vz,
        by,
        bz,
        e,
    }
}

#[inline]
fn star_cons(star: &Star, sm: f64, r: &[f64; NSCALARS]) -> Cons1D {
    let mut s = [0.0; NSCALARS];
    for n in 0..NSCALARS {
        s[n] = star.d * r[n];
    }
    Cons1D {
        d: star.d,
        mx: star.d * sm,
        my: star.d * star.vy,
        mz: star.d * star.vz,
        e: star.e,
        by: star.by,
        bz: star.bz,
        s,
    }
}

#[inline]
fn add_jump(f: &Cons1D, speed: f64, hi: &Cons1D, lo: &Cons1D) -> Cons1D {
    let mut s = [0.0; NSCALARS];
    for n in 0..NSCALARS {
        s[n] = f.s[n] + speed * (hi.s[n] - lo.s[n]);
    }
    Cons1D {
        d: f.d + speed * (hi.d - lo.d),
        mx: f.mx + speed * (hi.mx - lo.mx),
        my: f.my + speed * (hi.my - lo.my),
        mz: f.mz + speed * (hi.mz - lo.mz),
        e: f.e + speed * (hi.e - lo.e),
        by: f.by + speed * (hi.by - lo.by),
        bz: f.bz + speed * (hi.bz - lo.bz),
        s,
    }
}

/// HLLD flux between two adiabatic MHD interface states.
///
/// `etah > 0` enforces a floor on the outermost wave speeds, mirroring the
/// H-correction behavior of the HLL solver.
#[allow(clippy::too_many_arguments)]
pub fn hlld_flux(
    ul: &Cons1D,
    ur: &Cons1D,
    wl: &Prim1D,
    wr: &Prim1D,
    bxi: f64,
    etah: f64,
    eos: &EquationOfState,
    mhd: bool,
) -> Cons1D {
    let cfl = cfast(ul, bxi, eos, mhd);
    let cfr = cfast(ur, bxi, eos, mhd);
    let cmax = cfl.max(cfr);

    let mut sl = wl.vx.min(wr.vx) - cmax;
    let mut sr = wl.vx.max(wr.vx) + cmax;
    sl = sl.min(-etah);
    sr = sr.max(etah);

    let fl = physical_flux(ul, wl, bxi, eos, mhd);
    let fr = physical_flux(ur, wr, bxi, eos, mhd);

    if sl >= 0.0 {
        return fl;
    }
    if sr <= 0.0 {
        return fr;
    }

    let bx = if mhd { bxi } else { 0.0 };
    let pbl = 0.5 * (bx * bx + wl.by * wl.by + wl.bz * wl.bz);
    let pbr = 0.5 * (bx * bx + wr.by * wr.by + wr.bz * wr.bz);
    let ptl = wl.p + if mhd { pbl } else { 0.0 };
    let ptr = wr.p + if mhd { pbr } else { 0.0 };

    // Entropy-wave speed and total pressure of the star region (MK05 eqs.
    // 38-41).
    let ql = ul.d * (sl - wl.vx);
    let qr = ur.d * (sr - wr.vx);
    let sm = (qr * wr.vx - ql * wl.vx - ptr + ptl) / (qr - ql);
    let pt_star = (qr * ptl - ql * ptr + ql * qr * (wr.vx - wl.vx)) / (qr - ql);

    let star_l = star_state(ul, wl, bx, sl, sm, ptl, pt_star);
    let star_r = star_state(ur, wr, bx, sr, sm, ptr, pt_star);
    let usl = star_cons(&star_l, sm, &wl.r);
    let usr = star_cons(&star_r, sm, &wr.r);

    let mut f = if bx * bx > SMALL * pt_star.abs().max(1.0) {
        // Rotational discontinuities are present.
        let sqrt_dl = star_l.d.sqrt();
        let sqrt_dr = star_r.d.sqrt();
        let ssl = sm - bx.abs() / sqrt_dl;
        let ssr = sm + bx.abs() / sqrt_dr;

        if ssl >= 0.0 {
            add_jump(&fl, sl, &usl, ul)
        } else if ssr <= 0.0 {
            add_jump(&fr, sr, &usr, ur)
        } else {
            // Inner (star-star) states, MK05 eqs. 59-63.
            let sgn = if bx >= 0.0 { 1.0 } else { -1.0 };
            let inv = 1.0 / (sqrt_dl + sqrt_dr);
            let vy = inv * (sqrt_dl * star_l.vy + sqrt_dr * star_r.vy
                + sgn * (star_r.by - star_l.by));
            let vz = inv * (sqrt_dl * star_l.vz + sqrt_dr * star_r.vz
                + sgn * (star_r.bz - star_l.bz));
            let by = inv * (sqrt_dl * star_r.by + sqrt_dr * star_l.by
                + sgn * sqrt_dl * sqrt_dr * (star_r.vy - star_l.vy));
            let bz = inv * (sqrt_dl * star_r.bz + sqrt_dr * star_l.bz
                + sgn * sqrt_dl * sqrt_dr * (star_r.vz - star_l.vz));

            let vdotb_cc = sm * bx + vy * by + vz * bz;
            if sm >= 0.0 {
                let vdotb_l = sm * bx + star_l.vy * star_l.by + star_l.vz * star_l.bz;
                let ucc = star_cons(
                    &Star {
                        d: star_l.d,
                        vy,
                        vz,
                        by,
                        bz,
                        e: star_l.e - sgn * sqrt_dl * (vdotb_l - vdotb_cc),
                    },
                    sm,
                    &wl.r,
                );
                let fsl = add_jump(&fl, sl, &usl, ul);
                add_jump(&fsl, ssl, &ucc, &usl)
            } else {
                let vdotb_r = sm * bx + star_r.vy * star_r.by + star_r.vz * star_r.bz;
                let ucc = star_cons(
                    &Star {
                        d: star_r.d,
                        vy,
                        vz,
                        by,
                        bz,
                        e: star_r.e + sgn * sqrt_dr * (vdotb_r - vdotb_cc),
                    },
                    sm,
                    &wr.r,
                );
                let fsr = add_jump(&fr, sr, &usr, ur);
                add_jump(&fsr, ssr, &ucc, &usr)
            }
        }
    } else if sm >= 0.0 {
        // HLLC limit: contact only.
        add_jump(&fl, sl, &usl, ul)
    } else {
        add_jump(&fr, sr, &usr, ur)
    };

    upwind_scalars(&mut f, wl, wr);
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::prim1d_to_cons1d;
    use crate::riemann::hlle_flux;

    const GAMMA: f64 = 5.0 / 3.0;

    fn adiabatic() -> EquationOfState {
        EquationOfState::Adiabatic { gamma: GAMMA }
    }

    fn cons(w: &Prim1D, bx: f64, mhd: bool) -> Cons1D {
        prim1d_to_cons1d(w, bx, &adiabatic(), mhd)
    }

    #[test]
    fn test_continuous_state_gives_physical_flux() {
        let eos = adiabatic();
        let w = Prim1D {
            d: 1.0,
            vx: 0.3,
            vy: -0.2,
            vz: 0.1,
            p: 0.7,
            by: 0.4,
            bz: 0.6,
            ..Default::default()
        };
        let bx = 0.5;
        let u = cons(&w, bx, true);
        let f = hlld_flux(&u, &u, &w, &w, bx, 0.0, &eos, true);
        let exact = physical_flux(&u, &w, bx, &eos, true);
        assert!((f.d - exact.d).abs() < 1e-12);
        assert!((f.mx - exact.mx).abs() < 1e-12);
        assert!((f.my - exact.my).abs() < 1e-12);
        assert!((f.e - exact.e).abs() < 1e-12);
        assert!((f.by - exact.by).abs() < 1e-12);
        assert!((f.bz - exact.bz).abs() < 1e-12);
    }

    #[test]
    fn test_stationary_contact_is_exact() {
        // With bx = 0 and equal pressure/velocity, the contact sits at x=0
        // and carries no mass flux: HLLD must resolve it exactly.
        let eos = adiabatic();
        let wl = Prim1D {
            d: 2.0,
            p: 1.0,
            ..Default::default()
        };
        let wr = Prim1D {
            d: 1.0,
            p: 1.0,
            ..Default::default()
        };
        let ul = cons(&wl, 0.0, true);
        let ur = cons(&wr, 0.0, true);
        let f = hlld_flux(&ul, &ur, &wl, &wr, 0.0, 0.0, &eos, true);
        assert!(f.d.abs() < 1e-13);
        assert!(f.e.abs() < 1e-13);
        // HLLE in contrast diffuses the contact
        let fh = hlle_flux(&ul, &ur, &wl, &wr, 0.0, 0.0, &eos, true);
        assert!(fh.d.abs() > 1e-3);
    }

    #[test]
    fn test_supersonic_takes_upwind_flux() {
        let eos = adiabatic();
        let wl = Prim1D {
            d: 1.0,
            vx: 20.0,
            p: 1.0,
            by: 0.5,
            ..Default::default()
        };
        let wr = Prim1D {
            d: 0.8,
            vx: 20.0,
            p: 0.9,
            by: 0.4,
            ..Default::default()
        };
        let bx = 0.3;
        let ul = cons(&wl, bx, true);
        let ur = cons(&wr, bx, true);
        let f = hlld_flux(&ul, &ur, &wl, &wr, bx, 0.0, &eos, true);
        let exact = physical_flux(&ul, &wl, bx, &eos, true);
        assert!((f.d - exact.d).abs() < 1e-12);
        assert!((f.my - exact.my).abs() < 1e-12);
    }

    #[test]
    fn test_mass_flux_consistency_brio_wu_states() {
        // The Brio & Wu initial states: the flux must be finite and the fan
        // must open (nonzero mass flux towards the low-pressure side).
        let eos = EquationOfState::Adiabatic { gamma: 2.0 };
        let wl = Prim1D {
            d: 1.0,
            p: 1.0,
            by: 1.0,
            ..Default::default()
        };
        let wr = Prim1D {
            d: 0.125,
            p: 0.1,
            by: -1.0,
            ..Default::default()
        };
        let bx = 0.75;
        let ul = prim1d_to_cons1d(&wl, bx, &eos, true);
        let ur = prim1d_to_cons1d(&wr, bx, &eos, true);
        let f = hlld_flux(&ul, &ur, &wl, &wr, bx, 0.0, &eos, true);
        assert!(f.d.is_finite());
        assert!(f.e.is_finite());
        assert!(f.by.is_finite());
        assert!(f.d > 0.0);
    }

    #[test]
    fn test_scalar_flux_follows_mass_flux() {
        let eos = adiabatic();
        let wl = Prim1D {
            d: 1.0,
            vx: 1.0,
            p: 1.0,
            r: [0.25; NSCALARS],
            ..Default::default()
        };
        let wr = Prim1D {
            d: 1.0,
            vx: 1.0,
            p: 1.0,
            r: [0.75; NSCALARS],
            ..Default::default()
        };
        let ul = cons(&wl, 0.0, true);
        let ur = cons(&wr, 0.0, true);
        let f = hlld_flux(&ul, &ur, &wl, &wr, 0.0, 0.0, &eos, true);
        // Flow is to the right, so the left concentration is advected.
        assert!((f.s[0] - f.d * 0.25).abs() < 1e-13);
    }
}
