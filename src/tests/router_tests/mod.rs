mod imoveis_tests;
