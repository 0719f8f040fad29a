pub mod configuration;

pub mod math {
    pub mod curve {
        pub mod curveerror;
        pub mod key;
        pub mod coefficient;
        pub mod coefficientstore;
        pub mod jacobianaccumulator;
        pub mod vectorspaceevaluator;
        pub mod vectorspacecurve;
        pub mod vectorspacecurvevariant;

        pub mod linearinterpolation {
            pub mod linearinterpolationcurve;
            pub mod linearinterpolationevaluator;
        }
    }

    pub mod estimation {
        pub mod leastsquaresfit;
    }
}
